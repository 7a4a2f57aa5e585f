pub mod auth;
pub mod response;
pub mod role;

pub use auth::{jwt_auth_middleware, validate_user_middleware, AuthUser, CurrentUser};
pub use response::{ApiResponse, ApiResult};
pub use role::{ensure_admin, ensure_self_or_admin, require_admin};
