use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::{AiError, GenerateRequest, GenerativeModel, Part};
use crate::config::AiConfig;

/// Generative Language REST client (`models/{model}:generateContent`)
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, model: &str, api_key: &str) -> Result<Url, AiError> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let mut url = Url::parse(&base)
            .and_then(|b| b.join(&format!("v1beta/models/{}:generateContent", model)))
            .map_err(|e| AiError::Transport(format!("invalid AI base URL: {}", e)))?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

pub(crate) fn request_body(request: &GenerateRequest) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inline_data": { "mime_type": mime_type, "data": data }
            }),
        })
        .collect();

    let mut body = json!({ "contents": [{ "role": "user", "parts": parts }] });
    if request.json_output {
        body["generationConfig"] = json!({ "responseMimeType": "application/json" });
    }
    body
}

/// Concatenated text parts of the first candidate
pub(crate) fn response_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

pub(crate) fn classify_error(status: StatusCode, body: &Value) -> AiError {
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
        .to_string();
    let upstream_status = body.pointer("/error/status").and_then(Value::as_str);

    if status == StatusCode::TOO_MANY_REQUESTS || upstream_status == Some("RESOURCE_EXHAUSTED") {
        AiError::QuotaExhausted(message)
    } else {
        AiError::Upstream { status: status.as_u16(), message }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = self.endpoint(model, api_key)?;

        let response = self
            .http
            .post(url)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let text = response_text(&body);
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse(model.to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GeminiClient {
        let mut config = crate::config::AppConfig::development().ai;
        config.base_url = base.to_string();
        config.api_key = Some("k".into());
        GeminiClient::new(&config).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path_and_adds_key() {
        let url = client("https://proxy.example.com/gemini")
            .endpoint("gemini-1.5-flash", "abc")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/gemini/v1beta/models/gemini-1.5-flash:generateContent?key=abc"
        );
    }

    #[test]
    fn body_includes_inline_images_and_json_mode() {
        let request = GenerateRequest {
            parts: vec![
                Part::Text("명단".into()),
                Part::InlineData {
                    mime_type: "image/png".into(),
                    data: "AAAA".into(),
                },
            ],
            json_output: true,
        };
        let body = request_body(&request);
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn extracts_text_from_first_candidate() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "안녕" }, { "text": "하세요" }] } }]
        });
        assert_eq!(response_text(&body), "안녕하세요");
        assert_eq!(response_text(&json!({})), "");
    }

    #[test]
    fn resource_exhausted_is_quota() {
        let body = json!({
            "error": { "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        });
        assert!(classify_error(StatusCode::FORBIDDEN, &body).is_quota());
        assert!(classify_error(StatusCode::TOO_MANY_REQUESTS, &Value::Null).is_quota());
        let body = json!({ "error": { "message": "bad model" } });
        assert_eq!(
            classify_error(StatusCode::BAD_REQUEST, &body),
            AiError::Upstream {
                status: 400,
                message: "bad model".into()
            }
        );
    }
}
