use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{decode_jwt, Claims, JwtError};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Role, User};
use crate::database::repository::UserRepository;
use crate::error::ApiError;

/// Authenticated identity extracted from the JWT, before any database check
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// The token subject's fresh database row, injected by
/// [`validate_user_middleware`]. Authorization decisions read this, not the
/// token, so role changes take effect without waiting out old tokens.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// JWT authentication middleware: validates the bearer token and injects
/// [`AuthUser`] into the request
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = decode_jwt(&token).map_err(|e| match e {
        JwtError::InvalidToken(_) => ApiError::unauthorized("Invalid or expired token"),
        other => other.into(),
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Authentication token is missing".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Authentication token is missing".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

/// Re-checks the token subject against the users table on every request and
/// injects [`CurrentUser`]. A deleted account invalidates its outstanding
/// tokens immediately.
pub async fn validate_user_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let pool = DatabaseManager::pool().await?;
    let user = UserRepository::new(pool)
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                "Token subject {} no longer exists, rejecting request",
                auth_user.user_id
            );
            ApiError::unauthorized("Invalid authentication token")
        })?;

    if user.role != auth_user.role {
        tracing::warn!(
            "Role claim '{}' for user {} does not match current role '{}'",
            auth_user.role,
            user.id,
            user.role
        );
        return Err(ApiError::forbidden("User role has changed, please log in again"));
    }

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err, "Authentication token is missing");
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let headers = headers_with_auth("Bearer   ");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
