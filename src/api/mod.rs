use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
mod error;
mod general;
mod messages;
mod reports;
mod types;
mod uploads;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/users/signup", post(users::signup))
        .route("/users/admin/signup", post(users::admin_signup))
        .route("/users/signin", post(users::signin))
        .route("/users/admin/signin", post(users::admin_signin))
        .route("/users/otp-verification", post(users::request_otp))
        .route("/users/verify-otp", put(users::verify_otp))
        .route("/users/password-token", post(users::request_password_reset))
        .route("/users/{id}/reset-password", put(users::reset_password))
        .route("/users/slug/{slug}", get(users::get_by_slug))
        .route("/reports", get(reports::latest))
        .route("/reports/filters", get(reports::filtered))
        .route("/reports/slug/{slug}", get(reports::get_by_slug))
        .route("/reports/{id}", get(reports::get_by_id))
        .route("/general/summary", get(general::summary))
        .route("/general/health", get(general::health));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(create_protected_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Routes that need a signed-in account.
fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/profile", get(users::profile))
        .route("/users/{id}", get(users::get_by_id))
        .route("/reports", post(reports::create))
        .route("/uploads", post(uploads::upload))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
}

/// Routes restricted to admins; the admin gate sits inside the auth layer.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/add-user", post(users::add_user))
        .route("/messages/send", post(messages::send))
        .route("/users/{id}/block", put(users::set_blocked))
        .route("/users/{id}", delete(users::delete))
        .route("/reports/update-status", put(reports::bulk_update_status))
        .route("/reports/export", get(reports::export))
        .route("/uploads", get(uploads::list))
        .route("/reports/{id}", put(reports::update))
        .route("/reports/{id}/approve", put(reports::approve))
        .route("/reports/{id}/disapprove", put(reports::disapprove))
        .route("/reports/{id}", delete(reports::delete))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
}
