use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Login-capable account. `role` and `admin_status` are stored as text by the
/// backend; use the typed accessors instead of comparing strings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub admin_status: String,
    pub is_master: bool,
    pub church_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl ProfileRole {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "admin" => ProfileRole::Admin,
            _ => ProfileRole::Member,
        }
    }
}

impl AdminStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "pending" => AdminStatus::Pending,
            "approved" => AdminStatus::Approved,
            "rejected" => AdminStatus::Rejected,
            _ => AdminStatus::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::None => "none",
            AdminStatus::Pending => "pending",
            AdminStatus::Approved => "approved",
            AdminStatus::Rejected => "rejected",
        }
    }
}

impl Profile {
    pub fn role(&self) -> ProfileRole {
        ProfileRole::parse(&self.role)
    }

    pub fn admin_status(&self) -> AdminStatus {
        AdminStatus::parse(&self.admin_status)
    }
}
