use axum::Extension;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/auth/profile (also GET /api/users/profile) - Current user's row
///
/// The user-validation middleware already re-read the row for this request, so
/// this is a plain echo; the password hash is never serialized.
pub async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}
