use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::auth::capability::Scope;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    notice, AdminStatus, Church, Department, Group, Inquiry, MemberDirectory, Notice,
    PhoneVerification, Profile,
};
use crate::database::store::{
    AccountDirectory, ConsoleStore, Counter, DuplicateCheck, VerificationStore,
};
use crate::services::verification::normalize_phone;

#[derive(Default)]
struct Tables {
    churches: Vec<Church>,
    departments: Vec<Department>,
    groups: Vec<Group>,
    profiles: Vec<Profile>,
    members: Vec<MemberDirectory>,
    notices: Vec<Notice>,
    inquiries: Vec<Inquiry>,
    verifications: HashMap<String, PhoneVerification>,
    duplicates: HashMap<String, DuplicateCheck>,
}

/// In-process store with the same semantics as [`PgStore`](super::postgres::PgStore).
/// Used by the test suites and for running the API without a backend.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    changes: broadcast::Sender<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            tables: RwLock::new(Tables::default()),
            changes,
        }
    }

    pub async fn insert_church(&self, church: Church) {
        self.tables.write().await.churches.push(church);
    }

    pub async fn insert_department(&self, department: Department) {
        self.tables.write().await.departments.push(department);
    }

    pub async fn insert_group(&self, group: Group) {
        self.tables.write().await.groups.push(group);
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.tables.write().await.profiles.push(profile);
    }

    pub async fn insert_member(&self, member: MemberDirectory) {
        self.tables.write().await.members.push(member);
    }

    pub async fn insert_notice(&self, notice: Notice) {
        self.tables.write().await.notices.push(notice);
    }

    pub async fn insert_inquiry(&self, inquiry: Inquiry) {
        self.tables.write().await.inquiries.push(inquiry);
        self.notify_inquiry_change();
    }

    /// Registers the answer the duplicate-account RPC gives for `phone`
    pub async fn register_account_phone(&self, phone: &str, check: DuplicateCheck) {
        self.tables
            .write()
            .await
            .duplicates
            .insert(normalize_phone(phone), check);
    }

    pub async fn verification(&self, phone: &str) -> Option<PhoneVerification> {
        self.tables.read().await.verifications.get(phone).cloned()
    }

    pub async fn verification_count(&self) -> usize {
        self.tables.read().await.verifications.len()
    }

    pub fn notify_inquiry_change(&self) {
        // No receivers is fine: nobody is watching
        let _ = self.changes.send(());
    }
}

fn in_scope(scope: &Scope, church_id: Option<Uuid>, department_id: Option<Uuid>) -> bool {
    let church_ok = scope.church_id.map_or(true, |mine| church_id == Some(mine));
    let dept_ok = scope.department_id.map_or(true, |mine| department_id == Some(mine));
    church_ok && dept_ok
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn upsert_verification(&self, record: PhoneVerification) -> Result<(), DatabaseError> {
        self.tables
            .write()
            .await
            .verifications
            .insert(record.phone.clone(), record);
        Ok(())
    }

    async fn find_verification(
        &self,
        phone: &str,
    ) -> Result<Option<PhoneVerification>, DatabaseError> {
        Ok(self.tables.read().await.verifications.get(phone).cloned())
    }

    async fn delete_verification(&self, phone: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.verifications.remove(phone).is_some())
    }
}

#[async_trait]
impl AccountDirectory for MemoryStore {
    async fn check_phone_duplicate(&self, phone: &str) -> Result<DuplicateCheck, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .duplicates
            .get(phone)
            .cloned()
            .unwrap_or_default())
    }

    async fn members_by_phone(&self, phone: &str) -> Result<Vec<MemberDirectory>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MemberDirectory> = tables
            .members
            .iter()
            .filter(|m| m.normalized_phone().as_deref() == Some(phone))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(rows)
    }
}

#[async_trait]
impl ConsoleStore for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.tables.read().await.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn pending_admins(&self, scope: Scope) -> Result<Vec<Profile>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.role == "admin" && p.admin_status() == AdminStatus::Pending)
            .filter(|p| scope.church_id.map_or(true, |c| p.church_id == Some(c)))
            .cloned()
            .collect())
    }

    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
    ) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) if profile.admin_status() == from => {
                profile.admin_status = to.as_str().to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn church(&self, id: Uuid) -> Result<Option<Church>, DatabaseError> {
        Ok(self.tables.read().await.churches.iter().find(|c| c.id == id).cloned())
    }

    async fn department(&self, id: Uuid) -> Result<Option<Department>, DatabaseError> {
        Ok(self.tables.read().await.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn groups_in_department(&self, department_id: Uuid) -> Result<Vec<Group>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Group> = tables
            .groups
            .iter()
            .filter(|g| g.department_id == department_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn members_in_department(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<MemberDirectory>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MemberDirectory> = tables
            .members
            .iter()
            .filter(|m| m.department_id == Some(department_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(rows)
    }

    async fn notices(&self, scope: Scope) -> Result<Vec<Notice>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Notice> = tables
            .notices
            .iter()
            .filter(|n| n.visible_in(&scope))
            .cloned()
            .collect();
        notice::sort_for_display(&mut rows);
        Ok(rows)
    }

    async fn count(&self, counter: Counter, scope: Scope) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        let department_church = |id: Uuid| {
            tables
                .departments
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.church_id)
        };

        let count = match counter {
            Counter::Departments => tables
                .departments
                .iter()
                .filter(|d| in_scope(&scope, Some(d.church_id), Some(d.id)))
                .count(),
            Counter::Groups => tables
                .groups
                .iter()
                .filter(|g| {
                    in_scope(&scope, department_church(g.department_id), Some(g.department_id))
                })
                .count(),
            Counter::Members => tables
                .members
                .iter()
                .filter(|m| in_scope(&scope, m.church_id, m.department_id))
                .count(),
            Counter::Admins | Counter::PendingAdmins => {
                let wanted = if counter == Counter::Admins {
                    AdminStatus::Approved
                } else {
                    AdminStatus::Pending
                };
                tables
                    .profiles
                    .iter()
                    .filter(|p| p.role == "admin" && p.admin_status() == wanted)
                    .filter(|p| in_scope(&scope, p.church_id, p.department_id))
                    .count()
            }
            Counter::UnreadInquiries => {
                let church_only = Scope { department_id: None, ..scope };
                tables
                    .inquiries
                    .iter()
                    .filter(|i| i.is_admin_unread && in_scope(&church_only, i.church_id, None))
                    .count()
            }
        };
        Ok(count as i64)
    }

    async fn mark_inquiry_read(&self, id: Uuid, scope: Scope) -> Result<bool, DatabaseError> {
        let updated = {
            let mut tables = self.tables.write().await;
            match tables
                .inquiries
                .iter_mut()
                .find(|i| i.id == id && scope.church_id.map_or(true, |c| i.church_id == Some(c)))
            {
                Some(inquiry) => {
                    inquiry.is_admin_unread = false;
                    inquiry.updated_at = chrono::Utc::now();
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify_inquiry_change();
        }
        Ok(updated)
    }

    async fn subscribe_inquiry_changes(&self) -> Result<BoxStream<'static, ()>, DatabaseError> {
        let rx = self.changes.subscribe();
        let stream = stream::unfold(rx, |mut rx| async move {
            match rx.recv().await {
                // A lagged receiver missed events; one re-read covers all of them
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => Some(((), rx)),
                Err(broadcast::error::RecvError::Closed) => None,
            }
        });
        Ok(stream.boxed())
    }
}
