use axum::{Router, routing::get};

use crate::app::services::AppState;

pub mod drinks;
pub mod system;

/// Router for every endpoint, public and permission-gated.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(drinks::router(state.clone()))
        .fallback(system::not_found)
        .with_state(state)
}
