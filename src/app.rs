//! Router assembly
//!
//! Public: health, login, refresh, registration. Everything under
//! `/api/v1/protected` sits behind the access-token middleware.

use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub fn build_router(auth_state: AuthState) -> Router {
    // Public auth routes
    let public_routes = Router::new()
        .route("/auth/login", post(auth_api::login))
        .route("/auth/refresh", post(auth_api::refresh))
        .route("/users", post(auth_api::create_user))
        .with_state(auth_state.clone());

    // Protected API routes
    let protected_routes = Router::new()
        .route("/protected/me", get(auth_api::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            auth_state.jwt_handler.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
