use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::models::Role;
use crate::database::repository::{NewUser, StoreRepository, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register - Create a user account
///
/// Expected Input:
/// ```json
/// {
///   "name": "string",      // 20-60 characters
///   "email": "string",
///   "address": "string",   // up to 400 characters
///   "password": "string"   // 8-16 chars, one uppercase, one of !@#$%^&*
/// }
/// ```
///
/// New accounts always get the `user` role; elevated roles are granted only
/// through the admin user-management API.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    validation::validate_new_user(
        &payload.name,
        &payload.email,
        &payload.address,
        &payload.password,
    )?;

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok(ApiResponse::created(json!({ "id": user.id })).message("User registered successfully"))
}

/// POST /api/auth/login - Authenticate and receive a JWT
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "...", "name": "...", "email": "...", "role": "user", "store_id": null }
///   }
/// }
/// ```
///
/// Wrong email and wrong password produce the same 401 so the endpoint cannot
/// be used to probe which addresses have accounts.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool.clone());

    let user = users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!("Failed login attempt for {}", user.email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = generate_jwt(&Claims::new(user.id, user.role))?;

    // Store owners get their (first) store id so the client can land on the
    // owner dashboard without a second round trip.
    let store_id = if user.role == Role::StoreOwner {
        StoreRepository::new(pool)
            .find_by_owner(user.id)
            .await?
            .first()
            .map(|store| store.id)
    } else {
        None
    };

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
            "store_id": store_id,
        }
    }))
    .message("Login successful"))
}
