//! Ambient HTTP surface around the Session & Ownership Layer (`§4.3`) and
//! process introspection. Deliberately thin — claiming/releasing a
//! character and reading scheduler stats are not part of the WCP tool
//! catalogue (`§6`), but the Session Store has to be reachable by
//! *something* outside the narrator/player-PWA layer this core excludes
//! (`§1`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/sessions/claim", post(claim))
        .route("/sessions/release", post(release))
        .route("/sessions/validate", post(validate))
        .route("/scheduler/stats", get(scheduler_stats))
        .route("/ws", get(crate::transport::websocket::handler))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ClaimBody {
    player_id: String,
    character_id: i64,
}

async fn claim(State(state): State<AppState>, Json(body): Json<ClaimBody>) -> impl IntoResponse {
    match state.sessions.claim(&body.player_id, body.character_id).await {
        Ok(token) => (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response(),
        Err(err) => api_error(&err),
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    character_id: i64,
}

async fn release(State(state): State<AppState>, Json(body): Json<ReleaseBody>) -> impl IntoResponse {
    match state.sessions.release(body.character_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => api_error(&err),
    }
}

#[derive(Debug, Deserialize)]
struct ValidateBody {
    token: String,
}

async fn validate(State(state): State<AppState>, Json(body): Json<ValidateBody>) -> impl IntoResponse {
    match state.sessions.validate(&body.token) {
        Some(session) => Json(serde_json::json!({
            "valid": true,
            "player_id": session.player_id,
            "character_id": session.character_id,
        }))
        .into_response(),
        None => Json(serde_json::json!({ "valid": false })).into_response(),
    }
}

async fn scheduler_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.scheduler.stats())
}

fn api_error(err: &wcp_domain::error::Error) -> axum::response::Response {
    let status = match err {
        wcp_domain::error::Error::NotFound(_) => StatusCode::NOT_FOUND,
        wcp_domain::error::Error::AlreadyOwned(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}
