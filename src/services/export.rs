use serde::Serialize;
use uuid::Uuid;

use crate::auth::capability::Scope;
use crate::database::manager::DatabaseError;
use crate::database::models::Department;
use crate::database::store::ConsoleStore;
use crate::grouping::{build_board, GroupBoard};

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentExport {
    pub department: Department,
    pub headcount: usize,
    pub board: GroupBoard,
}

/// Build the group board for a department. `None` when the department does
/// not exist or lies outside `scope`; callers report both as not found.
pub async fn department_export(
    store: &dyn ConsoleStore,
    scope: Scope,
    department_id: Uuid,
) -> Result<Option<DepartmentExport>, DatabaseError> {
    let Some(department) = store.department(department_id).await? else {
        return Ok(None);
    };
    if !scope.allows_department(department.church_id, department.id) {
        tracing::warn!("Export of department {} refused: outside scope", department_id);
        return Ok(None);
    }

    let (groups, members) = tokio::try_join!(
        store.groups_in_department(department.id),
        store.members_in_department(department.id),
    )?;

    let board = build_board(&groups, &members);
    Ok(Some(DepartmentExport {
        department,
        headcount: board.headcount(),
        board,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Group, MemberDirectory};
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn export_pairs_members_inside_groups() {
        let store = MemoryStore::new();
        let church = Uuid::new_v4();
        let dept = Department { id: Uuid::new_v4(), name: "장년부".into(), church_id: church };
        let group = Group { id: Uuid::new_v4(), name: "1조".into(), department_id: dept.id };
        store.insert_department(dept.clone()).await;
        store.insert_group(group.clone()).await;

        for (name, spouse) in [("김철수", "이영희"), ("이영희", "김철수")] {
            let mut m = MemberDirectory::new(name);
            m.spouse_name = Some(spouse.into());
            m.group_id = Some(group.id);
            m.department_id = Some(dept.id);
            store.insert_member(m).await;
        }

        let scope = Scope { church_id: Some(church), department_id: None };
        let export = department_export(&store, scope, dept.id).await.unwrap().unwrap();
        assert_eq!(export.headcount, 2);
        assert_eq!(export.board.sections[0].members.len(), 1);
    }

    #[tokio::test]
    async fn other_churches_departments_are_hidden() {
        let store = MemoryStore::new();
        let dept = Department {
            id: Uuid::new_v4(),
            name: "청년부".into(),
            church_id: Uuid::new_v4(),
        };
        store.insert_department(dept.clone()).await;

        let scope = Scope {
            church_id: Some(Uuid::new_v4()),
            department_id: None,
        };
        assert!(department_export(&store, scope, dept.id).await.unwrap().is_none());
        let missing = department_export(&store, Scope::default(), Uuid::new_v4()).await;
        assert!(missing.unwrap().is_none());
    }
}
