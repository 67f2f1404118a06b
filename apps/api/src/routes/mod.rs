pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::contract::handlers::handle_generate;
use crate::extraction::handlers::handle_extract;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/extract", post(handle_extract))
        .route("/api/generate", post(handle_generate))
        .with_state(state)
}
