use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Registration, RegistrationWithStore, RegistrationWithUser};
use crate::database::repository::{RegistrationRepository, StoreRepository};
use crate::error::ApiError;
use crate::middleware::{ensure_self_or_admin, ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRequest {
    pub store_id: Uuid,
}

/// POST /api/registrations - Register the caller to a store
///
/// A registration is an opt-in association with a store, independent of
/// rating. At most one per (user, store); a duplicate answers 409.
pub async fn create_registration(
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<CreateRegistrationRequest>,
) -> ApiResult<Registration> {
    let pool = DatabaseManager::pool().await?;

    StoreRepository::new(pool.clone())
        .find_by_id(payload.store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    let registrations = RegistrationRepository::new(pool);

    if registrations
        .is_registered(caller.id, payload.store_id)
        .await?
    {
        return Err(ApiError::conflict("User is already registered to this store"));
    }

    // The UNIQUE constraint still backs this up: a concurrent duplicate
    // surfaces as a 409 through the database error mapping.
    let registration = registrations.create(payload.store_id, caller.id).await?;

    Ok(ApiResponse::created(registration).message("Successfully registered to store"))
}

/// GET /api/registrations/users/:user_id - A user's registrations (admin or self)
pub async fn user_registrations(
    Path(user_id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<Vec<RegistrationWithStore>> {
    ensure_self_or_admin(&caller, user_id)?;

    let pool = DatabaseManager::pool().await?;
    let registrations = RegistrationRepository::new(pool).find_by_user(user_id).await?;
    Ok(ApiResponse::list(registrations))
}

/// GET /api/registrations/stores/:store_id - A store's registrants
/// (admin, or that store's owner)
pub async fn store_registrations(
    Path(store_id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<Vec<RegistrationWithUser>> {
    let pool = DatabaseManager::pool().await?;

    let store = StoreRepository::new(pool.clone())
        .find_by_id(store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    if !caller.role.is_admin() && store.owner_id != caller.id {
        return Err(ApiError::forbidden("Permission denied"));
    }

    let registrations = RegistrationRepository::new(pool).find_by_store(store_id).await?;
    Ok(ApiResponse::list(registrations))
}

/// DELETE /api/registrations/:id - Leave a store (the registrant, or admin)
pub async fn delete_registration(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let registrations = RegistrationRepository::new(pool);

    let existing = registrations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Registration not found"))?;

    if !caller.role.is_admin() && existing.user_id != caller.id {
        return Err(ApiError::forbidden("Permission denied"));
    }

    registrations.delete(id).await?;

    Ok(ApiResponse::message_only("Successfully deleted registration"))
}
