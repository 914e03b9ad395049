use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    pub is_admin_unread: bool,
    pub user_id: Option<Uuid>,
    pub church_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
