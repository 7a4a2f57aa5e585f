use axum::extract::{Path, Query};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::StoreSummary;
use crate::database::repository::{RatingRepository, StoreFilter, StoreRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// GET /api/stores - Browse stores with their rating aggregates
///
/// Public: anyone may browse. Supports `?name=` and `?address=` substring
/// filters. Averages are recomputed per request.
pub async fn list_stores(Query(query): Query<StoreListQuery>) -> ApiResult<Vec<StoreSummary>> {
    let pool = DatabaseManager::pool().await?;
    let stores = StoreRepository::new(pool)
        .list(&StoreFilter {
            name: query.name,
            address: query.address,
        })
        .await?;

    Ok(ApiResponse::list(stores))
}

/// GET /api/stores/:id - Store detail with aggregates and its reviews
pub async fn get_store(Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let store = StoreRepository::new(pool.clone())
        .find_summary_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    let ratings = RatingRepository::new(pool).find_by_store(id).await?;

    let mut detail = serde_json::to_value(&store)?;
    detail["ratings"] = serde_json::to_value(&ratings)?;

    Ok(ApiResponse::success(detail))
}
