use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Registration, RegistrationWithStore, RegistrationWithUser};

pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        store_id: Uuid,
        user_id: Uuid,
    ) -> Result<Registration, DatabaseError> {
        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (store_id, user_id) VALUES ($1, $2) \
             RETURNING id, store_id, user_id, created_at",
        )
        .bind(store_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>, DatabaseError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, store_id, user_id, created_at FROM registrations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn is_registered(&self, user_id: Uuid, store_id: Uuid) -> Result<bool, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// A user's registrations with the store names joined in
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RegistrationWithStore>, DatabaseError> {
        let registrations = sqlx::query_as::<_, RegistrationWithStore>(
            "SELECT g.id, g.store_id, g.user_id, s.name AS store_name, g.created_at \
             FROM registrations g JOIN stores s ON s.id = g.store_id \
             WHERE g.user_id = $1 ORDER BY g.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    /// A store's registrants with user names joined in
    pub async fn find_by_store(
        &self,
        store_id: Uuid,
    ) -> Result<Vec<RegistrationWithUser>, DatabaseError> {
        let registrations = sqlx::query_as::<_, RegistrationWithUser>(
            "SELECT g.id, g.store_id, g.user_id, u.name AS user_name, g.created_at \
             FROM registrations g JOIN users u ON u.id = g.user_id \
             WHERE g.store_id = $1 ORDER BY g.created_at DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
