use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Rating, RatingWithUser};
use crate::database::repository::{RatingRepository, StoreRepository};
use crate::error::ApiError;
use crate::middleware::{ensure_self_or_admin, ApiResponse, ApiResult, CurrentUser};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// POST /api/ratings - Submit or replace the caller's rating for a store
///
/// Expected Input:
/// ```json
/// {
///   "store_id": "store_uuid",
///   "rating": 4,             // 1..=5
///   "comment": "string"      // optional
/// }
/// ```
///
/// The rater is always the authenticated caller. A first submission answers
/// 201; re-rating the same store replaces the earlier row and answers 200.
/// Either way the write is a single atomic upsert, so two concurrent
/// submissions can never leave two rows for the same (user, store) pair.
pub async fn submit_rating(
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<SubmitRatingRequest>,
) -> ApiResult<Rating> {
    validation::validate_rating_value(payload.rating)?;

    let pool = DatabaseManager::pool().await?;

    StoreRepository::new(pool.clone())
        .find_by_id(payload.store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    let ratings = RatingRepository::new(pool);

    // Probe only decides the status code; the upsert below is what enforces
    // the one-rating-per-store invariant.
    let already_rated = ratings
        .find_by_user_and_store(caller.id, payload.store_id)
        .await?
        .is_some();

    let stored = ratings
        .upsert(
            payload.store_id,
            caller.id,
            payload.rating,
            payload.comment.as_deref(),
        )
        .await?;

    if already_rated {
        Ok(ApiResponse::success(stored).message("Rating updated successfully"))
    } else {
        Ok(ApiResponse::created(stored).message("Rating created successfully"))
    }
}

/// GET /api/ratings/stores/:store_id - A store's ratings with rater names
pub async fn store_ratings(Path(store_id): Path<Uuid>) -> ApiResult<Vec<RatingWithUser>> {
    let pool = DatabaseManager::pool().await?;
    let ratings = RatingRepository::new(pool).find_by_store(store_id).await?;
    Ok(ApiResponse::list(ratings))
}

/// GET /api/ratings/users/:user_id - A user's ratings (admin, or the user)
pub async fn user_ratings(
    Path(user_id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<Vec<Rating>> {
    ensure_self_or_admin(&caller, user_id)?;

    let pool = DatabaseManager::pool().await?;
    let ratings = RatingRepository::new(pool).find_by_user(user_id).await?;
    Ok(ApiResponse::list(ratings))
}

/// PUT /api/ratings/:id - Edit a rating (author only)
pub async fn update_rating(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<UpdateRatingRequest>,
) -> ApiResult<Rating> {
    validation::validate_rating_value(payload.rating)?;

    let pool = DatabaseManager::pool().await?;
    let ratings = RatingRepository::new(pool);

    let existing = ratings
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Rating not found"))?;

    if existing.user_id != caller.id {
        return Err(ApiError::forbidden("Not authorized to update this rating"));
    }

    let updated = ratings
        .update(id, payload.rating, payload.comment.as_deref())
        .await?;

    Ok(ApiResponse::success(updated).message("Rating updated successfully"))
}

/// DELETE /api/ratings/:id - Remove a rating (author only)
pub async fn delete_rating(
    Path(id): Path<Uuid>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let ratings = RatingRepository::new(pool);

    let existing = ratings
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Rating not found"))?;

    if existing.user_id != caller.id {
        return Err(ApiError::forbidden("Not authorized to delete this rating"));
    }

    ratings.delete(id).await?;

    Ok(ApiResponse::message_only("Rating deleted successfully"))
}
