use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Congregant entry. Distinct from a login [`Profile`](super::Profile);
/// `person_id` links the two when the same person is known in both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MemberDirectory {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub spouse_name: Option<String>,
    pub children_info: Option<String>,
    pub group_name: Option<String>,
    pub group_id: Option<Uuid>,
    pub role_in_group: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub wedding_anniversary: Option<NaiveDate>,
    pub notes: Option<String>,
    pub church_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_linked: Option<bool>,
    pub person_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Leader,
    Member,
}

impl MemberDirectory {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            phone: None,
            spouse_name: None,
            children_info: None,
            group_name: None,
            group_id: None,
            role_in_group: None,
            birth_date: None,
            wedding_anniversary: None,
            notes: None,
            church_id: None,
            department_id: None,
            is_linked: None,
            person_id: None,
        }
    }

    pub fn group_role(&self) -> GroupRole {
        match self.role_in_group.as_deref().map(str::trim) {
            Some("leader") => GroupRole::Leader,
            _ => GroupRole::Member,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.group_role() == GroupRole::Leader
    }

    /// Phone with hyphens and whitespace removed
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().map(crate::services::verification::normalize_phone)
    }
}
