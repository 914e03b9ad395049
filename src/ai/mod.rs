pub mod client;
pub mod fallback;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

pub use client::GeminiClient;
pub use fallback::{FallbackChain, Generation};

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Base64 payload, passed through untouched
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    /// Ask the model for a JSON response body
    pub json_output: bool,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(prompt.into())],
            json_output: false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AiError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("model {0} returned an empty response")]
    EmptyResponse(String),

    #[error("no models configured")]
    NoModels,

    #[error("could not parse model output: {0}")]
    InvalidOutput(String),
}

impl AiError {
    pub fn is_quota(&self) -> bool {
        matches!(self, AiError::QuotaExhausted(_))
    }
}

/// One generation call against a named model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, AiError>;
}
