pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Papers API
        .route("/api/v1/papers", post(handlers::handle_generate))
        .route(
            "/api/v1/papers/:batch_id/sets/:set/:paper",
            get(handlers::handle_download_paper),
        )
        .route(
            "/api/v1/papers/:batch_id/answer-key.csv",
            get(handlers::handle_download_answer_key),
        )
        .with_state(state)
}
