//! Declarative field rules for user-supplied input. Failures are collected
//! into a per-field error map and returned as a single 400 response.

use std::collections::HashMap;

use crate::error::ApiError;

pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

fn name_error(name: &str) -> Option<String> {
    let len = name.chars().count();
    if len == 0 {
        Some("Name is required".to_string())
    } else if len < 20 {
        Some("Name must be at least 20 characters".to_string())
    } else if len > 60 {
        Some("Name cannot exceed 60 characters".to_string())
    } else {
        None
    }
}

fn email_error(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty() && !domain.is_empty() && domain.contains('.') =>
        {
            None
        }
        _ => Some("Invalid email format".to_string()),
    }
}

fn address_error(address: &str) -> Option<String> {
    let len = address.chars().count();
    if len == 0 {
        Some("Address is required".to_string())
    } else if len > 400 {
        Some("Address cannot exceed 400 characters".to_string())
    } else {
        None
    }
}

fn password_error(password: &str) -> Option<String> {
    let len = password.chars().count();
    if len == 0 {
        return Some("Password is required".to_string());
    }
    if !(8..=16).contains(&len) {
        return Some("Password must be 8-16 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Some("Password must contain at least one special character".to_string());
    }
    None
}

fn collect(checks: Vec<(&str, Option<String>)>) -> Result<(), ApiError> {
    let field_errors: HashMap<String, String> = checks
        .into_iter()
        .filter_map(|(field, error)| error.map(|e| (field.to_string(), e)))
        .collect();

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation error", field_errors))
    }
}

/// Full rule set for account creation (public register and admin create)
pub fn validate_new_user(
    name: &str,
    email: &str,
    address: &str,
    password: &str,
) -> Result<(), ApiError> {
    collect(vec![
        ("name", name_error(name)),
        ("email", email_error(email)),
        ("address", address_error(address)),
        ("password", password_error(password)),
    ])
}

/// Rules for a partial user update; absent fields are not checked
pub fn validate_user_changes(
    name: Option<&str>,
    email: Option<&str>,
    address: Option<&str>,
) -> Result<(), ApiError> {
    collect(vec![
        ("name", name.and_then(name_error)),
        ("email", email.and_then(email_error)),
        ("address", address.and_then(address_error)),
    ])
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    collect(vec![("password", password_error(password))])
}

pub fn validate_rating_value(value: i32) -> Result<(), ApiError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Rating must be between 1 and 5"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_NAME: &str = "Johnathan Maxwell Sterling";
    const GOOD_PASSWORD: &str = "Passw0rd!";

    #[test]
    fn accepts_a_fully_valid_user() {
        assert!(validate_new_user(GOOD_NAME, "jm@example.com", "12 Main St", GOOD_PASSWORD).is_ok());
    }

    #[test]
    fn name_must_be_20_to_60_chars() {
        assert!(name_error("Short Name").is_some());
        assert!(name_error(GOOD_NAME).is_none());
        assert!(name_error(&"x".repeat(61)).is_some());
        assert!(name_error(&"x".repeat(60)).is_none());
        assert!(name_error(&"x".repeat(20)).is_none());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(email_error("a@b.com").is_none());
        assert!(email_error("missing-at.com").is_some());
        assert!(email_error("@no-local.com").is_some());
        assert!(email_error("no-domain@").is_some());
        assert!(email_error("two@@ats.com").is_some());
        assert!(email_error("nodot@domain").is_some());
        assert!(email_error("").is_some());
    }

    #[test]
    fn address_is_capped_at_400() {
        assert!(address_error("12 Main St").is_none());
        assert!(address_error(&"a".repeat(400)).is_none());
        assert!(address_error(&"a".repeat(401)).is_some());
        assert!(address_error("").is_some());
    }

    #[test]
    fn password_rules() {
        assert!(password_error(GOOD_PASSWORD).is_none());
        // too short / too long
        assert!(password_error("Ab!x").is_some());
        assert!(password_error(&format!("Aa!{}", "x".repeat(16))).is_some());
        // missing uppercase
        assert!(password_error("password1!").is_some());
        // missing special
        assert!(password_error("Password1").is_some());
    }

    #[test]
    fn errors_are_collected_per_field() {
        let err = validate_new_user("short", "bad-email", "", "weak").unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                assert_eq!(field_errors.len(), 4);
                assert!(field_errors.contains_key("name"));
                assert!(field_errors.contains_key("email"));
                assert!(field_errors.contains_key("address"));
                assert!(field_errors.contains_key("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn partial_update_skips_absent_fields() {
        assert!(validate_user_changes(None, None, None).is_ok());
        assert!(validate_user_changes(Some("too short"), None, None).is_err());
        assert!(validate_user_changes(None, Some("a@b.io"), Some("5 High St")).is_ok());
    }

    #[test]
    fn rating_value_bounds() {
        for v in 1..=5 {
            assert!(validate_rating_value(v).is_ok());
        }
        assert!(validate_rating_value(0).is_err());
        assert!(validate_rating_value(6).is_err());
        assert!(validate_rating_value(-3).is_err());
    }
}
