use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::capability::Scope;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    AdminStatus, Church, Department, Group, MemberDirectory, Notice, PhoneVerification, Profile,
};

/// NOTIFY channel the backend fires when an inquiry row changes
pub const INQUIRY_CHANNEL: &str = "inquiry_changes";

/// Pending SMS codes, one row per phone
#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn upsert_verification(&self, record: PhoneVerification) -> Result<(), DatabaseError>;
    async fn find_verification(
        &self,
        phone: &str,
    ) -> Result<Option<PhoneVerification>, DatabaseError>;
    /// Returns whether a row was removed
    async fn delete_verification(&self, phone: &str) -> Result<bool, DatabaseError>;
}

/// Result of the backend's duplicate-account RPC
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub exists: bool,
    pub masked_email: Option<String>,
    pub full_name: Option<String>,
}

/// Lookups the function endpoints run with service credentials
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn check_phone_duplicate(&self, phone: &str) -> Result<DuplicateCheck, DatabaseError>;
    /// Members whose phone matches once hyphens and spaces are removed
    async fn members_by_phone(&self, phone: &str) -> Result<Vec<MemberDirectory>, DatabaseError>;
}

/// Aggregates shown on the console dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Departments,
    Groups,
    Members,
    Admins,
    PendingAdmins,
    UnreadInquiries,
}

#[async_trait]
pub trait ConsoleStore: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError>;
    async fn pending_admins(&self, scope: Scope) -> Result<Vec<Profile>, DatabaseError>;
    /// Moves `admin_status` from `from` to `to`; false when the row is gone or has moved on
    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
    ) -> Result<bool, DatabaseError>;

    async fn church(&self, id: Uuid) -> Result<Option<Church>, DatabaseError>;
    async fn department(&self, id: Uuid) -> Result<Option<Department>, DatabaseError>;
    async fn groups_in_department(&self, department_id: Uuid) -> Result<Vec<Group>, DatabaseError>;
    async fn members_in_department(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<MemberDirectory>, DatabaseError>;

    async fn notices(&self, scope: Scope) -> Result<Vec<Notice>, DatabaseError>;
    async fn count(&self, counter: Counter, scope: Scope) -> Result<i64, DatabaseError>;

    /// Clears the admin-unread flag; false when no row in scope matched
    async fn mark_inquiry_read(&self, id: Uuid, scope: Scope) -> Result<bool, DatabaseError>;
    /// One item per change notification; payloads are not interpreted
    async fn subscribe_inquiry_changes(&self) -> Result<BoxStream<'static, ()>, DatabaseError>;
}
