use uuid::Uuid;

use crate::auth::Scope;
use crate::cli::utils::output_json;
use crate::cli::{open_store, OutputFormat};
use crate::config::AppConfig;
use crate::services::church_stats;

pub async fn handle(
    config: &AppConfig,
    church: Option<Uuid>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = open_store(config);
    let scope = Scope {
        church_id: church,
        department_id: None,
    };
    let stats = church_stats(&store, scope).await?;

    match output_format {
        OutputFormat::Json => output_json(&stats)?,
        OutputFormat::Text => {
            let title = stats
                .church
                .as_ref()
                .map(|c| c.name.clone())
                .or_else(|| church.map(|id| id.to_string()))
                .unwrap_or_else(|| "All churches".to_string());
            println!("{}", title);
            println!("{}", "-".repeat(32));
            println!("{:<20} {}", "Departments", stats.departments);
            println!("{:<20} {}", "Groups", stats.groups);
            println!("{:<20} {}", "Members", stats.members);
            println!("{:<20} {}", "Admins", stats.admins);
            println!("{:<20} {}", "Pending admins", stats.pending_admins);
            println!("{:<20} {}", "Unread inquiries", stats.unread_inquiries);
        }
    }
    Ok(())
}
