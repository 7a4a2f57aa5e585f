use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store row with its rating aggregates. The aggregates are recomputed by a
/// LEFT JOIN + GROUP BY on every read, never cached.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub owner_id: Uuid,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
