pub mod llm;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::state::{AppState, LlmConfig, RateLimiter};

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const RATE_LIMIT_MAX_REQUESTS: u32 = 5;

/// Build a fully configured Router + shared state.
pub fn build_app(llm: LlmConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        http: reqwest::Client::new(),
        limiter: RateLimiter::new(RATE_LIMIT_WINDOW, RATE_LIMIT_MAX_REQUESTS),
        llm,
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/puzzle", post(routes::generate_puzzle))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
