//! Route definitions for the BudgetDesk HTTP API.
//!
//! Routes are grouped by the access level they require. The router
//! receives `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::middleware::access;
use crate::state::AppState;

/// Build the router with every route and its access middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .with_state(state)
}

/// Login, logout and health: no session required.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/health", get(handlers::health::health))
}

/// Any active user; the server token is rotated on every call.
fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/update", patch(handlers::auth::update))
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
        .route("/budget/create-budget-info", post(handlers::budget::create))
        .route("/budget/get-budget-info", get(handlers::budget::list))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            access::require_authenticated,
        ))
}

/// Account administration.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/update/{id}", patch(handlers::auth::update_by_admin))
        .route("/auth/delete/{id}", delete(handlers::auth::delete_user))
        .route("/auth/activate/{id}", patch(handlers::auth::activate_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            access::require_admin,
        ))
}
