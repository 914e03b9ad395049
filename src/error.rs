// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::ai::AiError;
use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::services::verification::VerificationError;

/// Shown to end users when the generative API quota is exhausted
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "AI 사용량 한도를 초과했습니다. 잠시 후 다시 시도해주세요.";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    AccountExists {
        masked_email: Option<String>,
        full_name: Option<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::AccountExists { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::TooManyRequests(_) => 429,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::AccountExists { .. } => "account_exists",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::AccountExists { .. } => "ACCOUNT_EXISTS",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::AccountExists { masked_email, full_name } => json!({
                "error": "account_exists",
                "masked_email": masked_email,
                "full_name": full_name,
            }),
            _ => json!({
                "error": self.message(),
                "code": self.error_code(),
            }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database configuration missing: {}", name);
                ApiError::internal_server_error(format!("{} is not configured", name))
            }
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
            | DatabaseError::Sqlx(sqlx::Error::Io(_)) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::MissingApiKey => {
                ApiError::internal_server_error("GEMINI_API_KEY is not configured")
            }
            AiError::QuotaExhausted(detail) => {
                tracing::warn!("Generative API quota exhausted: {}", detail);
                ApiError::too_many_requests(QUOTA_EXCEEDED_MESSAGE)
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::AccountExists {
                masked_email,
                full_name,
            } => ApiError::AccountExists {
                masked_email,
                full_name,
            },
            VerificationError::Database(e) => e.into(),
            VerificationError::Sms(e) => {
                tracing::error!("SMS delivery failed: {}", e);
                ApiError::internal_server_error(e.to_string())
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret => {
                ApiError::internal_server_error("JWT_SECRET is not configured")
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_exists_carries_lookup_fields() {
        let err = ApiError::AccountExists {
            masked_email: Some("ab***@example.com".into()),
            full_name: Some("홍길동".into()),
        };
        assert_eq!(err.status_code(), 400);
        let body = err.to_json();
        assert_eq!(body["error"], "account_exists");
        assert_eq!(body["masked_email"], "ab***@example.com");
        assert_eq!(body["full_name"], "홍길동");
    }

    #[test]
    fn quota_errors_map_to_localized_429() {
        let err: ApiError = AiError::QuotaExhausted("429".into()).into();
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.message(), QUOTA_EXCEEDED_MESSAGE);
    }

    #[test]
    fn missing_configuration_is_500() {
        let err: ApiError = DatabaseError::ConfigMissing("SERVICE_DATABASE_URL").into();
        assert_eq!(err.status_code(), 500);
        let err: ApiError = AiError::MissingApiKey.into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn database_errors_hide_details() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), 503);
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Database error occurred");
        let err: ApiError = DatabaseError::NotFound("profile".into()).into();
        assert_eq!(err.status_code(), 404);
    }
}
