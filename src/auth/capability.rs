use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{AdminStatus, Profile, ProfileRole};
use crate::error::ApiError;

/// What a signed-in profile may do in the console. Every handler works from
/// this value instead of inspecting `is_master`/`role`/`admin_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    SystemMaster,
    ChurchAdmin {
        church_id: Uuid,
        department_id: Option<Uuid>,
    },
    Unauthorized,
}

/// Row filter applied to console queries. `None` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub church_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

impl Capability {
    pub fn resolve(profile: &Profile) -> Self {
        if profile.is_master {
            return Capability::SystemMaster;
        }
        match (profile.role(), profile.admin_status(), profile.church_id) {
            (ProfileRole::Admin, AdminStatus::Approved, Some(church_id)) => {
                Capability::ChurchAdmin {
                    church_id,
                    department_id: profile.department_id,
                }
            }
            _ => Capability::Unauthorized,
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        match *self {
            Capability::SystemMaster => Some(Scope::default()),
            Capability::ChurchAdmin { church_id, department_id } => Some(Scope {
                church_id: Some(church_id),
                department_id,
            }),
            Capability::Unauthorized => None,
        }
    }

    /// Scope for console reads, or 403
    pub fn require_console(&self) -> Result<Scope, ApiError> {
        self.scope()
            .ok_or_else(|| ApiError::forbidden("Administrator approval required"))
    }

    pub fn require_master(&self) -> Result<(), ApiError> {
        match self {
            Capability::SystemMaster => Ok(()),
            _ => Err(ApiError::forbidden("Master privileges required")),
        }
    }
}

impl Scope {
    pub fn allows_church(&self, church_id: Uuid) -> bool {
        self.church_id.map_or(true, |mine| mine == church_id)
    }

    pub fn allows_department(&self, church_id: Uuid, department_id: Uuid) -> bool {
        self.allows_church(church_id)
            && self.department_id.map_or(true, |mine| mine == department_id)
    }

    /// Narrow a master's global scope to one church; admins stay pinned to their own
    pub fn narrowed_to(self, church_id: Option<Uuid>) -> Result<Scope, ApiError> {
        match (self.church_id, church_id) {
            (None, requested) => Ok(Scope { church_id: requested, department_id: None }),
            (Some(mine), Some(requested)) if mine != requested => {
                Err(ApiError::forbidden("Church is outside your scope"))
            }
            (Some(_), _) => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminDecision {
    Approve,
    Reject,
}

impl AdminStatus {
    /// Only pending requests can be decided
    pub fn decide(self, decision: AdminDecision) -> Result<AdminStatus, ApiError> {
        match (self, decision) {
            (AdminStatus::Pending, AdminDecision::Approve) => Ok(AdminStatus::Approved),
            (AdminStatus::Pending, AdminDecision::Reject) => Ok(AdminStatus::Rejected),
            (status, _) => Err(ApiError::conflict(format!(
                "Admin request is {}, not pending",
                status.as_str()
            ))),
        }
    }
}
