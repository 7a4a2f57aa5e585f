mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_rejects_invalid_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Short name, malformed email, empty address, weak password
    let payload = json!({
        "name": "Shorty",
        "email": "not-an-email",
        "address": "",
        "password": "weak"
    });

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&payload)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["name", "email", "address", "password"] {
        assert!(
            body["errors"].get(field).is_some(),
            "expected an error for '{}': {}",
            field,
            body
        );
    }
    Ok(())
}

#[tokio::test]
async fn register_requires_a_json_body() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .send()
        .await?;

    assert!(
        res.status().is_client_error(),
        "expected a client error, got {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn login_requires_email_and_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "", "password": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_user_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "Wr0ngPass!" }))
        .send()
        .await?;

    // 401 against a seeded database; 5xx when no database is reachable
    assert!(
        res.status() == StatusCode::UNAUTHORIZED || res.status().is_server_error(),
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn rating_submission_authenticates_before_validating() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // No token at all: auth must reject before any validation runs
    let res = client
        .post(format!("{}/api/ratings", server.base_url))
        .json(&json!({ "store_id": "00000000-0000-0000-0000-000000000000", "rating": 9 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
