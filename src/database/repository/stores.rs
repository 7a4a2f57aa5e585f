use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Store, StoreSummary};

const STORE_COLUMNS: &str = "id, name, description, address, owner_id, created_at, updated_at";

/// Aggregated select: averages are recomputed by the join on every read
const SUMMARY_SELECT: &str = "SELECT s.id, s.name, s.description, s.address, s.owner_id, \
     COALESCE(AVG(r.rating), 0)::float8 AS average_rating, \
     COUNT(r.id) AS rating_count, \
     s.created_at, s.updated_at \
     FROM stores s LEFT JOIN ratings r ON r.store_id = s.id";

pub struct NewStore {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub owner_id: Uuid,
}

/// Partial update; `None` leaves the column untouched. The owner is immutable
/// through this path.
#[derive(Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
}

pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, store: NewStore) -> Result<Store, DatabaseError> {
        let sql = format!(
            "INSERT INTO stores (name, description, address, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING {STORE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Store>(&sql)
            .bind(&store.name)
            .bind(&store.description)
            .bind(&store.address)
            .bind(store.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Plain row without aggregates, for existence and permission checks
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, DatabaseError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn find_summary_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<StoreSummary>, DatabaseError> {
        let sql = format!("{SUMMARY_SELECT} WHERE s.id = $1 GROUP BY s.id");
        let store = sqlx::query_as::<_, StoreSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<StoreSummary>, DatabaseError> {
        let sql = format!("{SUMMARY_SELECT} WHERE s.owner_id = $1 GROUP BY s.id ORDER BY s.name");
        let stores = sqlx::query_as::<_, StoreSummary>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<StoreSummary>, DatabaseError> {
        let mut qb = Self::list_query(filter);
        let stores = qb
            .build_query_as::<StoreSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    fn list_query(filter: &StoreFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("{SUMMARY_SELECT} WHERE 1=1"));
        if let Some(name) = &filter.name {
            qb.push(" AND s.name ILIKE ");
            qb.push_bind(format!("%{}%", name));
        }
        if let Some(address) = &filter.address {
            qb.push(" AND s.address ILIKE ");
            qb.push_bind(format!("%{}%", address));
        }
        qb.push(" GROUP BY s.id ORDER BY s.name");
        qb
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update(&self, id: Uuid, changes: StoreChanges) -> Result<Store, DatabaseError> {
        let sql = format!(
            "UPDATE stores SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                address = COALESCE($4, address), \
                updated_at = now() \
             WHERE id = $1 RETURNING {STORE_COLUMNS}"
        );
        sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.address)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Store not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_select_recomputes_aggregates() {
        assert!(SUMMARY_SELECT.contains("AVG(r.rating)"));
        assert!(SUMMARY_SELECT.contains("COUNT(r.id)"));
        assert!(SUMMARY_SELECT.contains("LEFT JOIN ratings"));
    }

    #[test]
    fn list_query_appends_filters_before_group_by() {
        let filter = StoreFilter {
            name: Some("coffee".to_string()),
            address: None,
        };
        let sql_string;
        {
            let qb = StoreRepository::list_query(&filter);
            sql_string = qb.sql().to_string();
        }
        assert!(sql_string.contains("s.name ILIKE $1"));
        let filter_pos = sql_string.find("ILIKE").unwrap();
        let group_pos = sql_string.find("GROUP BY").unwrap();
        assert!(filter_pos < group_pos);
    }
}
