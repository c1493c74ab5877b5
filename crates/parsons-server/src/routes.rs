use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use parsons_core::Puzzle;
use parsons_core::protocol::{GenerateRequest, GenerateResponse, validate_task};

use crate::llm;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// Rate-limit key: forwarded client address when behind a proxy.
fn client_key(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

pub async fn generate_puzzle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> (StatusCode, Json<GenerateResponse>) {
    if state.limiter.is_limited(client_key(&headers)) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(GenerateResponse::error(
                "Rate limit exceeded, please try again later.",
            )),
        );
    }

    let task = match validate_task(&req.task) {
        Ok(task) => task.to_string(),
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(GenerateResponse::error(message)),
            );
        }
    };

    // Prefer the caller's key, then the server's; with neither, fall back to
    // the built-in samples so the board stays usable offline.
    let api_key = req
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| state.llm.api_key.clone());

    let raw = match api_key {
        Some(key) => match llm::request_puzzle(&state.http, &state.llm, &key, &task).await {
            Ok(puzzle) => puzzle,
            Err(e) => {
                eprintln!("[llm] generation failed: {}", e);
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(GenerateResponse::error(
                        "Failed to generate puzzle. Please check your API key and try again.",
                    )),
                );
            }
        },
        None => llm::sample_puzzle(&mut rand::rng()),
    };

    (
        StatusCode::OK,
        Json(GenerateResponse::ok(Puzzle::from_generated(raw.blocks))),
    )
}
