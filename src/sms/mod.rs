use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS gateway request failed: {0}")]
    Transport(String),
    #[error("SMS gateway rejected message with status {0}")]
    Rejected(u16),
    #[error("SMS_GATEWAY_URL must be set outside development")]
    NotConfigured,
}

/// Delivers verification codes
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError>;
}

pub fn verification_message(code: &str) -> String {
    format!("[교회 관리] 인증번호 [{}]를 입력해주세요. (3분 이내)", code)
}

/// Development gateway: writes the code to the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LoggingGateway;

#[async_trait]
impl SmsGateway for LoggingGateway {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        tracing::info!("SMS to {}: {}", phone, verification_message(code));
        Ok(())
    }
}

/// Relay when `SMS_GATEWAY_URL` is set; the logging gateway is only allowed in development
pub fn gateway_for(config: &AppConfig) -> Result<Arc<dyn SmsGateway>, SmsError> {
    match &config.sms.gateway_url {
        Some(url) => Ok(Arc::new(HttpGateway::new(url.clone())?)),
        None if config.is_development() => Ok(Arc::new(LoggingGateway)),
        None => Err(SmsError::NotConfigured),
    }
}

/// Posts `{ to, text }` to an HTTP relay
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    url: String,
}

impl HttpGateway {
    pub fn new(url: impl Into<String>) -> Result<Self, SmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SmsError::Transport(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }
}

#[async_trait]
impl SmsGateway for HttpGateway {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "to": phone, "text": verification_message(code) }))
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SmsError::Rejected(response.status().as_u16()));
        }
        tracing::debug!("SMS relayed to {}", phone);
        Ok(())
    }
}
