use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user's opt-in association with a store, independent of rating
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Registration joined with the store name, for a user's registration list
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationWithStore {
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub store_name: String,
    pub created_at: DateTime<Utc>,
}

/// Registration joined with the registrant's name, for a store's member list
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationWithUser {
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}
