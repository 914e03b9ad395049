use serde::Serialize;

use super::{AiError, GenerateRequest, GenerativeModel};

/// Successful output and the model that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub model: String,
    pub text: String,
}

/// Ordered list of model names tried one after another.
///
/// The first non-empty response wins and later models are never called. No
/// retries within a model, no backoff, and nothing is remembered between runs.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    models: Vec<String>,
}

impl FallbackChain {
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    /// When every model fails the last error is returned, except that a quota
    /// failure from any attempt takes precedence.
    pub async fn run(
        &self,
        backend: &dyn GenerativeModel,
        request: &GenerateRequest,
    ) -> Result<Generation, AiError> {
        let mut last_error = AiError::NoModels;
        let mut quota_error = None;

        for model in &self.models {
            match backend.generate(model, request).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!("Model {} produced {} bytes", model, text.len());
                    return Ok(Generation { model: model.clone(), text });
                }
                Ok(_) => {
                    tracing::warn!("Model {} returned an empty response, trying next", model);
                    last_error = AiError::EmptyResponse(model.clone());
                }
                // Same answer from every model; no point walking the chain
                Err(AiError::MissingApiKey) => return Err(AiError::MissingApiKey),
                Err(e) => {
                    tracing::warn!("Model {} failed: {}, trying next", model, e);
                    if e.is_quota() {
                        quota_error = Some(e.clone());
                    }
                    last_error = e;
                }
            }
        }

        Err(quota_error.unwrap_or(last_error))
    }
}
