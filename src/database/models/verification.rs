use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pending SMS code, keyed by normalized phone number
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhoneVerification {
    pub phone: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub is_verified: bool,
}

impl PhoneVerification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
