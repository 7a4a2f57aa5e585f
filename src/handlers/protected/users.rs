use axum::extract::{Path, Query};
use axum::{Extension, Json};
use futures::future;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Role, User};
use crate::database::repository::{
    NewUser, StoreRepository, UserChanges, UserFilter, UserRepository,
};
use crate::error::ApiError;
use crate::middleware::{ensure_admin, ensure_self_or_admin, ApiResponse, ApiResult, CurrentUser};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Store owners carry their stores and an overall rating in listings; everyone
/// else serializes as a plain row.
async fn enriched_user_value(user: User, stores: &StoreRepository) -> Result<Value, ApiError> {
    if user.role != Role::StoreOwner {
        return Ok(serde_json::to_value(&user)?);
    }

    let owned = stores.find_by_owner(user.id).await?;
    let rated: Vec<f64> = owned
        .iter()
        .filter(|store| store.rating_count > 0)
        .map(|store| store.average_rating)
        .collect();
    let rating = if rated.is_empty() {
        0.0
    } else {
        (rated.iter().sum::<f64>() / rated.len() as f64 * 10.0).round() / 10.0
    };

    let mut value = serde_json::to_value(&user)?;
    value["stores"] = serde_json::to_value(&owned)?;
    value["rating"] = json!(rating);
    Ok(value)
}

/// POST /api/users - Create a user with an explicit role (admin only)
pub async fn create_user(Json(payload): Json<CreateUserRequest>) -> ApiResult<User> {
    validation::validate_new_user(
        &payload.name,
        &payload.email,
        &payload.address,
        &payload.password,
    )?;

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("Email already in use"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            password_hash,
            role: payload.role.unwrap_or(Role::User),
        })
        .await?;

    Ok(ApiResponse::created(user).message("User created successfully"))
}

/// GET /api/users - List users with optional filters (admin only)
///
/// Supports `?name=`, `?email=`, `?address=` substring filters and an exact
/// `?role=` filter.
pub async fn list_users(Query(query): Query<UserListQuery>) -> ApiResult<Vec<Value>> {
    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool.clone());

    let rows = users
        .list(&UserFilter {
            name: query.name,
            email: query.email,
            address: query.address,
            role: query.role,
        })
        .await?;

    let enriched = future::try_join_all(rows.into_iter().map(|user| {
        let stores = StoreRepository::new(pool.clone());
        async move { enriched_user_value(user, &stores).await }
    }))
    .await?;

    Ok(ApiResponse::list(enriched))
}

/// GET /api/users/count (admin only)
pub async fn users_count() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let count = UserRepository::new(pool).count().await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// GET /api/users/:id - Fetch one user (admin, or the user themselves)
pub async fn get_user(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<Value> {
    ensure_self_or_admin(&caller, id)?;

    let pool = DatabaseManager::pool().await?;
    let user = UserRepository::new(pool.clone()).find_by_id_404(id).await?;
    let value = enriched_user_value(user, &StoreRepository::new(pool)).await?;

    Ok(ApiResponse::success(value))
}

/// PUT /api/users/:id - Partial update of name/email/address/role (admin only)
pub async fn update_user(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    ensure_admin(&caller)?;
    validation::validate_user_changes(
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.address.as_deref(),
    )?;

    let pool = DatabaseManager::pool().await?;
    let user = UserRepository::new(pool)
        .update(
            id,
            UserChanges {
                name: payload.name,
                email: payload.email,
                address: payload.address,
                role: payload.role,
            },
        )
        .await?;

    Ok(ApiResponse::success(user).message("User updated successfully"))
}

/// DELETE /api/users/:id (admin only)
pub async fn delete_user(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<()> {
    ensure_admin(&caller)?;

    let pool = DatabaseManager::pool().await?;
    let deleted = UserRepository::new(pool).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("Admin {} deleted user {}", caller.id, id);
    Ok(ApiResponse::message_only("User deleted successfully"))
}

/// PUT /api/users/:id/password - Change a password
///
/// Users change their own password and must present the current one; admins
/// may reset anyone's without it. The new password goes through the same rules
/// as registration.
pub async fn update_password(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<()> {
    ensure_self_or_admin(&caller, id)?;
    validation::validate_password(&payload.new_password)?;

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);
    let target = users.find_by_id_404(id).await?;

    if !caller.role.is_admin() {
        let current = payload.current_password.as_deref().ok_or_else(|| {
            ApiError::bad_request("Current password and new password are required")
        })?;
        if !verify_password(current, &target.password_hash)? {
            return Err(ApiError::bad_request("Current password is incorrect"));
        }
    }

    let password_hash = hash_password(&payload.new_password)?;
    users.update_password(id, &password_hash).await?;

    Ok(ApiResponse::message_only("Password updated successfully"))
}
