use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(
    config: &AppConfig,
    user: Uuid,
    email: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if !config.is_development() {
        tracing::warn!("Minting a token outside development ({:?})", config.environment);
    }

    let claims = Claims::new(user, email, config.auth.jwt_expiry_hours);
    let token = generate_jwt(&config.auth, &claims)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token generated",
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
