mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn expect_unauthorized(res: reqwest::Response) -> Result<serde_json::Value> {
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "expected 401");
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(body)
}

#[tokio::test]
async fn profile_requires_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/profile", server.base_url))
        .send()
        .await?;

    let body = expect_unauthorized(res).await?;
    assert_eq!(body["message"], "Authentication token is missing");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/profile", server.base_url))
        .header("Authorization", "Bearer not.a.jwt")
        .send()
        .await?;

    let body = expect_unauthorized(res).await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users/profile", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;

    expect_unauthorized(res).await?;
    Ok(())
}

#[tokio::test]
async fn admin_stats_requires_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/admin/stats", server.base_url))
        .send()
        .await?;

    expect_unauthorized(res).await?;
    Ok(())
}

#[tokio::test]
async fn mutating_routes_require_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let ratings = client
        .post(format!("{}/api/ratings", server.base_url))
        .json(&json!({ "store_id": "00000000-0000-0000-0000-000000000000", "rating": 5 }))
        .send()
        .await?;
    expect_unauthorized(ratings).await?;

    let registrations = client
        .post(format!("{}/api/registrations", server.base_url))
        .json(&json!({ "store_id": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await?;
    expect_unauthorized(registrations).await?;

    let stores = client
        .post(format!("{}/api/stores", server.base_url))
        .json(&json!({ "name": "Nope", "address": "1 Nowhere" }))
        .send()
        .await?;
    expect_unauthorized(stores).await?;

    Ok(())
}

#[tokio::test]
async fn store_browsing_is_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/stores", server.base_url))
        .send()
        .await?;

    // Reaches the database layer with no auth: 200 with a database, 5xx without.
    // The point is that it is never a 401.
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
