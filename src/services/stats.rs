use serde::Serialize;

use crate::auth::capability::Scope;
use crate::database::manager::DatabaseError;
use crate::database::models::Church;
use crate::database::store::{ConsoleStore, Counter};

#[derive(Debug, Clone, Serialize)]
pub struct ChurchStats {
    pub church: Option<Church>,
    pub scope: Scope,
    pub departments: i64,
    pub groups: i64,
    pub members: i64,
    pub admins: i64,
    pub pending_admins: i64,
    pub unread_inquiries: i64,
}

/// Dashboard counts for one scope. The counts are independent queries and
/// run concurrently; the first failure aborts the whole aggregate.
pub async fn church_stats(
    store: &dyn ConsoleStore,
    scope: Scope,
) -> Result<ChurchStats, DatabaseError> {
    let church = async {
        match scope.church_id {
            Some(id) => store.church(id).await,
            None => Ok(None),
        }
    };

    let (church, departments, groups, members, admins, pending_admins, unread_inquiries) =
        tokio::try_join!(
            church,
            store.count(Counter::Departments, scope),
            store.count(Counter::Groups, scope),
            store.count(Counter::Members, scope),
            store.count(Counter::Admins, scope),
            store.count(Counter::PendingAdmins, scope),
            store.count(Counter::UnreadInquiries, scope),
        )?;

    Ok(ChurchStats {
        church,
        scope,
        departments,
        groups,
        members,
        admins,
        pending_admins,
        unread_inquiries,
    })
}
