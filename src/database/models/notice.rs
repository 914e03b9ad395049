use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::capability::Scope;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub is_global: bool,
    pub church_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_pinned: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    /// Global notices are visible everywhere; church notices only inside the
    /// church, and department notices only to that department (or church-wide admins).
    pub fn visible_in(&self, scope: &Scope) -> bool {
        if self.is_global {
            return true;
        }
        let Some(church_id) = scope.church_id else {
            return true;
        };
        if self.church_id != Some(church_id) {
            return false;
        }
        match (scope.department_id, self.department_id) {
            (_, None) => true,
            (None, Some(_)) => true,
            (Some(mine), Some(theirs)) => mine == theirs,
        }
    }
}

/// Pinned first, then newest first
pub fn sort_for_display(notices: &mut [Notice]) {
    notices.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
