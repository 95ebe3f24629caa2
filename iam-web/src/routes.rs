//! Route definitions for the IAM web server
//!
//! Reads, login and sign-up are open. Mutations sit behind the
//! authentication gate, which runs only for the routes it is layered on.

use crate::{handlers, middleware::auth_middleware, AppState};
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

/// Routes that never require a token
pub fn open_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Credentials
        .route("/auth/login", post(handlers::login))
        .route("/auth/signup", post(handlers::signup))
        // Reads
        .route("/permissions", get(handlers::list_permissions))
        .route("/permissions/{id}", get(handlers::get_permission))
        .route("/users", get(handlers::list_users))
        .route("/users/{find}", get(handlers::get_user))
        .route(
            "/users/{find}/permissions",
            get(handlers::list_user_permissions),
        )
}

/// Routes wrapped by the authentication gate
pub fn gated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/permissions", post(handlers::create_permission))
        .route(
            "/permissions/{id}",
            put(handlers::update_permission).delete(handlers::delete_permission),
        )
        .route("/users", post(handlers::create_user))
        .route(
            "/users/{find}",
            axum::routing::delete(handlers::delete_user),
        )
        .route(
            "/users/{find}/permissions/{permission_name}",
            patch(handlers::grant_permission).delete(handlers::revoke_permission),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Create all routes combined
pub fn all_routes(state: AppState) -> Router<AppState> {
    open_routes().merge(gated_routes(state))
}
