use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Rating, RatingWithUser};

const RATING_COLUMNS: &str = "id, store_id, user_id, rating, comment, created_at, updated_at";

pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the caller's rating for a store in one atomic
    /// statement. The UNIQUE (user_id, store_id) constraint backs the
    /// one-rating-per-user-per-store invariant; concurrent submissions cannot
    /// produce a second row.
    pub async fn upsert(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Rating, DatabaseError> {
        let sql = format!(
            "INSERT INTO ratings (store_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, store_id) DO UPDATE \
             SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = now() \
             RETURNING {RATING_COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Rating>(&sql)
            .bind(store_id)
            .bind(user_id)
            .bind(rating)
            .bind(comment)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, DatabaseError> {
        let sql = format!("SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1");
        let rating = sqlx::query_as::<_, Rating>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    pub async fn find_by_user_and_store(
        &self,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<Option<Rating>, DatabaseError> {
        let sql =
            format!("SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND store_id = $2");
        let rating = sqlx::query_as::<_, Rating>(&sql)
            .bind(user_id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    /// A store's ratings with each rater's display name
    pub async fn find_by_store(&self, store_id: Uuid) -> Result<Vec<RatingWithUser>, DatabaseError> {
        let ratings = sqlx::query_as::<_, RatingWithUser>(
            "SELECT r.id, r.store_id, r.user_id, r.rating, r.comment, \
                    u.name AS user_name, r.created_at, r.updated_at \
             FROM ratings r JOIN users u ON u.id = r.user_id \
             WHERE r.store_id = $1 ORDER BY r.created_at DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Rating>, DatabaseError> {
        let sql = format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    pub async fn update(
        &self,
        id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Rating, DatabaseError> {
        let sql = format!(
            "UPDATE ratings SET rating = $2, comment = $3, updated_at = now() \
             WHERE id = $1 RETURNING {RATING_COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&sql)
            .bind(id)
            .bind(rating)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Rating not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
