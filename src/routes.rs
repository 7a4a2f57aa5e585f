use axum::{
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin, validate_user_middleware};

pub fn app() -> Router {
    Router::new()
        // Public surface
        .route("/", get(root))
        .route("/api/health", get(health))
        .merge(public_routes())
        // Everything behind JWT auth + user validation
        .merge(protected_routes())
        // Unknown routes answer JSON, not a bare 404
        .fallback(not_found)
        // Global middleware
        .layer(cors_layer(&config::config().security))
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        // Browsing stores requires no account
        .route("/api/stores", get(public::stores::list_stores))
        .route("/api/stores/:id", get(public::stores::get_store))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(store_routes())
        .merge(rating_routes())
        .merge(registration_routes())
        .merge(admin_routes())
        // Outermost first: decode the token, then re-check the subject row
        .layer(from_fn(validate_user_middleware))
        .layer(from_fn(jwt_auth_middleware))
}

fn auth_routes() -> Router {
    Router::new().route("/api/auth/profile", get(protected::auth::profile))
}

fn user_routes() -> Router {
    use protected::users;

    let admin_only = Router::new()
        .route("/api/users", post(users::create_user).get(users::list_users))
        .route("/api/users/count", get(users::users_count))
        .route_layer(from_fn(require_admin));

    Router::new()
        .route("/api/users/profile", get(protected::auth::profile))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/users/:id/password", put(users::update_password))
        .merge(admin_only)
}

fn store_routes() -> Router {
    use protected::stores;

    let admin_only = Router::new()
        .route("/api/stores/count", get(stores::stores_count))
        .route_layer(from_fn(require_admin));

    Router::new()
        .route("/api/stores", post(stores::create_store))
        .route("/api/stores/owned", get(stores::owned_stores))
        .route(
            "/api/stores/:id",
            put(stores::update_store).delete(stores::delete_store),
        )
        .merge(admin_only)
}

fn rating_routes() -> Router {
    use protected::ratings;

    Router::new()
        .route("/api/ratings", post(ratings::submit_rating))
        .route("/api/ratings/stores/:store_id", get(ratings::store_ratings))
        .route("/api/ratings/users/:user_id", get(ratings::user_ratings))
        .route(
            "/api/ratings/:id",
            put(ratings::update_rating).delete(ratings::delete_rating),
        )
}

fn registration_routes() -> Router {
    use protected::registrations;

    Router::new()
        .route("/api/registrations", post(registrations::create_registration))
        .route(
            "/api/registrations/users/:user_id",
            get(registrations::user_registrations),
        )
        .route(
            "/api/registrations/stores/:store_id",
            get(registrations::store_registrations),
        )
        .route(
            "/api/registrations/:id",
            axum::routing::delete(registrations::delete_registration),
        )
}

fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/stats", get(protected::admin::stats))
        .route_layer(from_fn(require_admin))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        // Development default: no origin list configured
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Store Ratings API",
            "version": version,
            "endpoints": {
                "health": "/api/health (public)",
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/profile (protected)",
                "users": "/api/users[/:id] (admin), /api/users/:id/password (self)",
                "stores": "/api/stores[/:id] (browse public, manage protected)",
                "ratings": "/api/ratings[/:id], /api/ratings/stores/:id, /api/ratings/users/:id (protected)",
                "registrations": "/api/registrations[/:id] (protected)",
                "admin": "/api/admin/stats (admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "Database unavailable",
                "code": "SERVICE_UNAVAILABLE",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("API endpoint not found")
}
