use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::PgListener;
use uuid::Uuid;

use crate::auth::capability::Scope;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AdminStatus, Church, Department, Group, MemberDirectory, Notice, PhoneVerification, Profile,
};
use crate::database::store::{
    AccountDirectory, ConsoleStore, Counter, DuplicateCheck, VerificationStore, INQUIRY_CHANNEL,
};

const PROFILE_COLUMNS: &str =
    "id, full_name, email, phone, role, admin_status, is_master, church_id, department_id";

const MEMBER_COLUMNS: &str = "id, full_name, phone, spouse_name, children_info, group_name, \
     group_id, role_in_group, birth_date, wedding_anniversary, notes, church_id, department_id, \
     is_linked, person_id";

/// Store backed by the church backend's Postgres database
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseManager,
}

impl PgStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    fn count_sql(counter: Counter) -> &'static str {
        match counter {
            Counter::Departments => {
                "SELECT COUNT(*) FROM departments \
                 WHERE ($1::uuid IS NULL OR church_id = $1) AND ($2::uuid IS NULL OR id = $2)"
            }
            Counter::Groups => {
                "SELECT COUNT(*) FROM groups g JOIN departments d ON d.id = g.department_id \
                 WHERE ($1::uuid IS NULL OR d.church_id = $1) AND ($2::uuid IS NULL OR d.id = $2)"
            }
            Counter::Members => {
                "SELECT COUNT(*) FROM member_directory \
                 WHERE ($1::uuid IS NULL OR church_id = $1) \
                 AND ($2::uuid IS NULL OR department_id = $2)"
            }
            Counter::Admins => {
                "SELECT COUNT(*) FROM profiles WHERE role = 'admin' AND admin_status = 'approved' \
                 AND ($1::uuid IS NULL OR church_id = $1) \
                 AND ($2::uuid IS NULL OR department_id = $2)"
            }
            Counter::PendingAdmins => {
                "SELECT COUNT(*) FROM profiles WHERE role = 'admin' AND admin_status = 'pending' \
                 AND ($1::uuid IS NULL OR church_id = $1) \
                 AND ($2::uuid IS NULL OR department_id = $2)"
            }
            // Inquiries are addressed to the church, not a department
            Counter::UnreadInquiries => {
                "SELECT COUNT(*) FROM inquiries WHERE is_admin_unread \
                 AND ($1::uuid IS NULL OR church_id = $1)"
            }
        }
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn upsert_verification(&self, record: PhoneVerification) -> Result<(), DatabaseError> {
        let pool = self.db.service_pool().await?;
        sqlx::query(
            r#"
            INSERT INTO phone_verifications (phone, code, expires_at, is_verified)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone) DO UPDATE
            SET code = EXCLUDED.code,
                expires_at = EXCLUDED.expires_at,
                is_verified = EXCLUDED.is_verified
            "#,
        )
        .bind(&record.phone)
        .bind(&record.code)
        .bind(record.expires_at)
        .bind(record.is_verified)
        .execute(&pool)
        .await?;
        Ok(())
    }

    async fn find_verification(
        &self,
        phone: &str,
    ) -> Result<Option<PhoneVerification>, DatabaseError> {
        let pool = self.db.service_pool().await?;
        let row = sqlx::query_as::<_, PhoneVerification>(
            "SELECT phone, code, expires_at, is_verified FROM phone_verifications WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn delete_verification(&self, phone: &str) -> Result<bool, DatabaseError> {
        let pool = self.db.service_pool().await?;
        let result = sqlx::query("DELETE FROM phone_verifications WHERE phone = $1")
            .bind(phone)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountDirectory for PgStore {
    async fn check_phone_duplicate(&self, phone: &str) -> Result<DuplicateCheck, DatabaseError> {
        let pool = self.db.service_pool().await?;
        let row: Option<(bool, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT p_exists, p_masked_email, p_full_name FROM check_phone_duplicate($1)",
        )
        .bind(phone)
        .fetch_optional(&pool)
        .await?;

        Ok(match row {
            Some((exists, masked_email, full_name)) => DuplicateCheck {
                exists,
                masked_email,
                full_name,
            },
            None => DuplicateCheck::default(),
        })
    }

    async fn members_by_phone(&self, phone: &str) -> Result<Vec<MemberDirectory>, DatabaseError> {
        let pool = self.db.service_pool().await?;
        let sql = format!(
            "SELECT {} FROM member_directory \
             WHERE regexp_replace(COALESCE(phone, ''), '[-[:space:]]', '', 'g') = $1 \
             ORDER BY full_name",
            MEMBER_COLUMNS
        );
        let rows = sqlx::query_as::<_, MemberDirectory>(&sql)
            .bind(phone)
            .fetch_all(&pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ConsoleStore for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }

    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(row)
    }

    async fn pending_admins(&self, scope: Scope) -> Result<Vec<Profile>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let sql = format!(
            "SELECT {} FROM profiles WHERE role = 'admin' AND admin_status = 'pending' \
             AND ($1::uuid IS NULL OR church_id = $1) ORDER BY full_name",
            PROFILE_COLUMNS
        );
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(scope.church_id)
            .fetch_all(&pool)
            .await?;
        Ok(rows)
    }

    async fn set_admin_status(
        &self,
        id: Uuid,
        from: AdminStatus,
        to: AdminStatus,
    ) -> Result<bool, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let result =
            sqlx::query("UPDATE profiles SET admin_status = $3 WHERE id = $1 AND admin_status = $2")
                .bind(id)
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn church(&self, id: Uuid) -> Result<Option<Church>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let row =
            sqlx::query_as::<_, Church>("SELECT id, name, address FROM churches WHERE id = $1")
                .bind(id)
                .fetch_optional(&pool)
                .await?;
        Ok(row)
    }

    async fn department(&self, id: Uuid) -> Result<Option<Department>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let row = sqlx::query_as::<_, Department>(
            "SELECT id, name, church_id FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn groups_in_department(&self, department_id: Uuid) -> Result<Vec<Group>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let rows = sqlx::query_as::<_, Group>(
            "SELECT id, name, department_id FROM groups WHERE department_id = $1 ORDER BY name",
        )
        .bind(department_id)
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn members_in_department(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<MemberDirectory>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let sql = format!(
            "SELECT {} FROM member_directory WHERE department_id = $1 ORDER BY full_name",
            MEMBER_COLUMNS
        );
        let rows = sqlx::query_as::<_, MemberDirectory>(&sql)
            .bind(department_id)
            .fetch_all(&pool)
            .await?;
        Ok(rows)
    }

    async fn notices(&self, scope: Scope) -> Result<Vec<Notice>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let rows = sqlx::query_as::<_, Notice>(
            r#"
            SELECT id, title, content, category, is_global, church_id, department_id,
                   is_pinned, created_by, created_at
            FROM notices
            WHERE is_global
               OR $1::uuid IS NULL
               OR (church_id = $1
                   AND ($2::uuid IS NULL OR department_id IS NULL OR department_id = $2))
            ORDER BY is_pinned DESC, created_at DESC
            "#,
        )
        .bind(scope.church_id)
        .bind(scope.department_id)
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self, counter: Counter, scope: Scope) -> Result<i64, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let mut query = sqlx::query_as::<_, (i64,)>(Self::count_sql(counter)).bind(scope.church_id);
        if counter != Counter::UnreadInquiries {
            query = query.bind(scope.department_id);
        }
        let (count,) = query.fetch_one(&pool).await?;
        Ok(count)
    }

    async fn mark_inquiry_read(&self, id: Uuid, scope: Scope) -> Result<bool, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let result = sqlx::query(
            "UPDATE inquiries SET is_admin_unread = false, updated_at = now() \
             WHERE id = $1 AND ($2::uuid IS NULL OR church_id = $2)",
        )
        .bind(id)
        .bind(scope.church_id)
        .execute(&pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(INQUIRY_CHANNEL)
            .bind(id.to_string())
            .execute(&pool)
            .await?;
        Ok(true)
    }

    async fn subscribe_inquiry_changes(&self) -> Result<BoxStream<'static, ()>, DatabaseError> {
        let pool = self.db.main_pool().await?;
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(INQUIRY_CHANNEL).await?;

        let stream = listener.into_stream().filter_map(|notification| {
            futures::future::ready(match notification {
                Ok(_) => Some(()),
                Err(e) => {
                    // The listener reconnects on its own; a re-read on the next event catches up
                    tracing::warn!("Inquiry listener error: {}", e);
                    None
                }
            })
        });
        Ok(stream.boxed())
    }
}
