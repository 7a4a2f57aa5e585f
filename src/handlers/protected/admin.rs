use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::repository::{RatingRepository, StoreRepository, UserRepository};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/admin/stats - Dashboard row counts (admin only)
///
/// Expected Output:
/// ```json
/// { "success": true, "data": { "users": 12, "stores": 4, "ratings": 37 } }
/// ```
pub async fn stats() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool.clone());
    let stores = StoreRepository::new(pool.clone());
    let ratings = RatingRepository::new(pool);

    let (users_count, stores_count, ratings_count) =
        tokio::try_join!(users.count(), stores.count(), ratings.count())?;

    Ok(ApiResponse::success(json!({
        "users": users_count,
        "stores": stores_count,
        "ratings": ratings_count,
    })))
}
