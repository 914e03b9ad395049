use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub sms: SmsConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Console connection (row-level policies apply)
    pub url: Option<String>,
    /// Service-role connection used by the function endpoints
    pub service_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret the backend signs session tokens with
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Fallback order, first entry tried first
    pub models: Vec<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub test_phone: String,
    pub test_code: String,
    pub code_ttl_secs: i64,
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub permissive_cors: bool,
    pub cors_origins: Vec<String>,
}

pub const DEFAULT_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        // Database
        self.database.url = non_empty(env::var("DATABASE_URL").ok()).or(self.database.url);
        self.database.service_url =
            non_empty(env::var("SERVICE_DATABASE_URL").ok()).or(self.database.service_url);
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.auth.jwt_expiry_hours = v.parse().unwrap_or(self.auth.jwt_expiry_hours);
        }

        // AI
        self.ai.api_key = non_empty(env::var("GEMINI_API_KEY").ok()).or(self.ai.api_key);
        if let Ok(v) = env::var("AI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Ok(v) = env::var("AI_MODELS") {
            let models = parse_list(&v);
            if !models.is_empty() {
                self.ai.models = models;
            }
        }
        if let Ok(v) = env::var("AI_REQUEST_TIMEOUT_SECS") {
            self.ai.request_timeout_secs = v.parse().unwrap_or(self.ai.request_timeout_secs);
        }

        // SMS
        if let Ok(v) = env::var("SMS_TEST_PHONE") {
            self.sms.test_phone = v;
        }
        self.sms.gateway_url = non_empty(env::var("SMS_GATEWAY_URL").ok()).or(self.sms.gateway_url);

        // Security
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = parse_list(&v);
            self.security.permissive_cors = false;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                service_url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
            },
            ai: AiConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
                request_timeout_secs: 60,
            },
            sms: SmsConfig {
                test_phone: "01000000000".to_string(),
                test_code: "123456".to_string(),
                code_ttl_secs: 180,
                gateway_url: None,
            },
            security: SecurityConfig {
                permissive_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.auth.jwt_expiry_hours = 24;
        config.security.permissive_cors = false;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.auth.jwt_expiry_hours = 4;
        config.ai.request_timeout_secs = 30;
        config.security.permissive_cors = false;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert!(config.security.permissive_cors);
        assert_eq!(config.sms.test_phone, "01000000000");
        assert_eq!(config.sms.test_code, "123456");
        assert_eq!(config.sms.code_ttl_secs, 180);
        assert_eq!(config.ai.models.first().map(String::as_str), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.is_development());
        assert!(!config.security.permissive_cors);
        assert_eq!(config.ai.models.len(), DEFAULT_MODELS.len());
    }

    #[test]
    fn parses_model_lists() {
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn blank_secrets_are_treated_as_missing() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("k".to_string())), Some("k".to_string()));
    }
}
