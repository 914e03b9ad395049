use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{prompts, GenerateRequest, Part};
use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::json_body;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Base64 image, optionally as a `data:<mime>;base64,` URL
    pub image: Option<String>,
    pub text: Option<String>,
    pub mime_type: Option<String>,
}

/// POST /functions/extract-members - pull member rows out of a roster photo or text
///
/// Expected Output:
/// ```json
/// { "data": [{ "full_name": "홍길동", "phone": "010-1234-5678", "group_name": "1조" }] }
/// ```
pub async fn extract_members(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload, "image or text is required")?;
    let generate = build_request(&request)?;

    let generation = state.chain.run(state.model.as_ref(), &generate).await?;
    let members = prompts::extract_json_array(&generation.text)?;
    tracing::info!("Extracted {} members with {}", members.len(), generation.model);

    Ok(Json(json!({ "data": members })))
}

fn build_request(request: &ExtractRequest) -> Result<GenerateRequest, ApiError> {
    let image = request.image.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let text = request.text.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if image.is_none() && text.is_none() {
        return Err(ApiError::bad_request("image or text is required"));
    }

    let mut parts = vec![Part::Text(prompts::member_extraction_prompt(text))];
    if let Some(image) = image {
        let (embedded_mime, data) = split_data_url(image);
        let mime_type = request
            .mime_type
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or(embedded_mime)
            .unwrap_or(DEFAULT_MIME_TYPE);
        parts.push(Part::InlineData {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        });
    }

    Ok(GenerateRequest { parts, json_output: true })
}

/// `data:image/png;base64,AAAA` -> (Some("image/png"), "AAAA")
fn split_data_url(image: &str) -> (Option<&str>, &str) {
    image
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map_or((None, image), |(mime, data)| (Some(mime), data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_image_or_text() {
        let blank = ExtractRequest { text: Some("  ".into()), ..Default::default() };
        assert_eq!(build_request(&blank).unwrap_err().status_code(), 400);
    }

    #[test]
    fn image_defaults_to_jpeg() {
        let request = ExtractRequest { image: Some("AAAA".into()), ..Default::default() };
        let generate = build_request(&request).unwrap();
        assert!(generate.json_output);
        assert_eq!(
            generate.parts[1],
            Part::InlineData { mime_type: "image/jpeg".into(), data: "AAAA".into() }
        );
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let request = ExtractRequest {
            image: Some("data:image/png;base64,QUJD".into()),
            ..Default::default()
        };
        let generate = build_request(&request).unwrap();
        assert_eq!(
            generate.parts[1],
            Part::InlineData { mime_type: "image/png".into(), data: "QUJD".into() }
        );
    }
}
