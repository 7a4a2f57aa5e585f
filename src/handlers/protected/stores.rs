use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Role, StoreSummary};
use crate::database::repository::{
    NewStore, StoreChanges, StoreRepository, UserRepository,
};
use crate::error::ApiError;
use crate::middleware::{ensure_admin, ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    /// Only honored for admin callers; everyone else owns what they create
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
}

/// POST /api/stores - Create a store (admin or store_owner)
pub async fn create_store(
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<CreateStoreRequest>,
) -> ApiResult<StoreSummary> {
    if !matches!(caller.role, Role::Admin | Role::StoreOwner) {
        return Err(ApiError::forbidden("Permission denied"));
    }
    if payload.name.trim().is_empty() || payload.address.trim().is_empty() {
        return Err(ApiError::bad_request("Store name and address are required"));
    }

    let pool = DatabaseManager::pool().await?;

    let owner_id = match (caller.role, payload.owner_id) {
        (Role::Admin, Some(owner_id)) => {
            UserRepository::new(pool.clone())
                .find_by_id(owner_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Owner user not found"))?;
            owner_id
        }
        _ => caller.id,
    };

    let store = StoreRepository::new(pool)
        .create(NewStore {
            name: payload.name,
            description: payload.description,
            address: payload.address,
            owner_id,
        })
        .await?;

    tracing::info!("Created store {} for owner {}", store.id, store.owner_id);

    // A brand-new store has no ratings yet, so the aggregates are known
    let summary = StoreSummary {
        id: store.id,
        name: store.name,
        description: store.description,
        address: store.address,
        owner_id: store.owner_id,
        average_rating: 0.0,
        rating_count: 0,
        created_at: store.created_at,
        updated_at: store.updated_at,
    };

    Ok(ApiResponse::created(summary).message("Store created successfully"))
}

/// GET /api/stores/owned - The caller's stores with aggregates (store_owner)
pub async fn owned_stores(
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<Vec<StoreSummary>> {
    if !matches!(caller.role, Role::Admin | Role::StoreOwner) {
        return Err(ApiError::forbidden("Permission denied"));
    }

    let pool = DatabaseManager::pool().await?;
    let stores = StoreRepository::new(pool).find_by_owner(caller.id).await?;

    Ok(ApiResponse::list(stores))
}

/// GET /api/stores/count (admin only)
pub async fn stores_count() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let count = StoreRepository::new(pool).count().await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// PUT /api/stores/:id - Update a store (admin, or the store's owner)
pub async fn update_store(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<UpdateStoreRequest>,
) -> ApiResult<StoreSummary> {
    let pool = DatabaseManager::pool().await?;
    let stores = StoreRepository::new(pool);

    let store = stores
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    if !caller.role.is_admin() && store.owner_id != caller.id {
        return Err(ApiError::forbidden("Permission denied"));
    }

    stores
        .update(
            id,
            StoreChanges {
                name: payload.name,
                description: payload.description,
                address: payload.address,
            },
        )
        .await?;

    let updated = stores
        .find_summary_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    Ok(ApiResponse::success(updated).message("Store updated successfully"))
}

/// DELETE /api/stores/:id (admin only)
pub async fn delete_store(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<()> {
    ensure_admin(&caller)?;

    let pool = DatabaseManager::pool().await?;
    let deleted = StoreRepository::new(pool).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Store not found"));
    }

    tracing::info!("Admin {} deleted store {}", caller.id, id);
    Ok(ApiResponse::message_only("Store deleted successfully"))
}
