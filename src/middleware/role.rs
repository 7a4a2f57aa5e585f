use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::auth::CurrentUser;
use crate::database::models::User;
use crate::error::ApiError;

/// Route-level gate for admin-only route groups. Mixed rules (admin-or-owner,
/// admin-or-self) stay in the handlers.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.role.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

pub fn ensure_admin(user: &User) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Permission denied"))
    }
}

pub fn ensure_self_or_admin(user: &User, target_id: Uuid) -> Result<(), ApiError> {
    if user.role.is_admin() || user.id == target_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Permission denied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use chrono::Utc;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User With A Long Enough Name".to_string(),
            email: "test@example.com".to_string(),
            address: "1 Test Street".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_passes_both_checks() {
        let admin = user_with_role(Role::Admin);
        assert!(ensure_admin(&admin).is_ok());
        assert!(ensure_self_or_admin(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn non_admin_fails_admin_check() {
        let user = user_with_role(Role::User);
        assert!(ensure_admin(&user).is_err());
        let owner = user_with_role(Role::StoreOwner);
        assert!(ensure_admin(&owner).is_err());
    }

    #[test]
    fn self_check_accepts_own_id_only() {
        let user = user_with_role(Role::User);
        assert!(ensure_self_or_admin(&user, user.id).is_ok());
        assert!(ensure_self_or_admin(&user, Uuid::new_v4()).is_err());
    }
}
