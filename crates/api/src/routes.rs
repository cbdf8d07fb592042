//! Route definitions.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/pairs", post(handlers::create_pair))
        .route("/pairs/{token_a}/{token_b}", get(handlers::get_pair))
        .route("/pools", get(handlers::list_pools))
        .route("/pools/{pair_id}", get(handlers::get_pool))
        .route("/pools/{pair_id}/deposits", post(handlers::deposit))
        .route("/pools/{pair_id}/withdrawals", post(handlers::withdraw))
        .route("/pools/{pair_id}/quote", post(handlers::quote))
        .route(
            "/pools/{pair_id}/swaps",
            post(handlers::swap).get(handlers::swap_history),
        )
        .route("/pools/{pair_id}/history", get(handlers::price_history))
        .route("/positions/{user_id}/{pool_id}", get(handlers::get_position))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
