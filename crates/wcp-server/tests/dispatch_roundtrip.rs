use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use wcp_domain::config::Config;
use wcp_kernel::Kernel;
use wcp_providers::{GenerationOptions, LlmRouter, StubBackend};
use wcp_protocol::envelope::Request;
use wcp_scheduler::CycleEngine;
use wcp_sessions::SessionStore;
use wcp_server::dispatch::{dispatch, AuthContext};
use wcp_server::state::AppState;

async fn test_state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}", db_path.display());
    let opts = SqliteConnectOptions::from_str(&url)
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .unwrap();
    wcp_persistence::migrations::run(&pool).await.unwrap();

    let kernel = Arc::new(Kernel::new(pool.clone()));
    let sessions = Arc::new(SessionStore::new(pool.clone(), 24));
    let minor_factory: wcp_providers::BackendFactory =
        Arc::new(|| Arc::new(StubBackend::constant(r#"{"action":"wait"}"#)) as Arc<dyn wcp_providers::LlmBackend>);
    let story_factory = minor_factory.clone();
    let router = Arc::new(LlmRouter::new(minor_factory, story_factory, GenerationOptions::default()));
    let scheduler = Arc::new(CycleEngine::new(kernel.clone(), router.clone(), 1));

    let state = AppState {
        config: Arc::new(Config::from_env()),
        kernel,
        sessions,
        scheduler,
        router,
    };
    (dir, state)
}

fn request(id: u64, method: &str, params: serde_json::Value) -> Request {
    Request::new(id, method, Some(params))
}

#[tokio::test]
async fn world_and_area_create_then_read_roundtrip() {
    let (_dir, state) = test_state().await;
    let auth = AuthContext::local();

    let resp = dispatch(
        &state,
        request(1, "tools/call", json!({"name": "world_create", "arguments": {"name": "Aeth", "description": "a world"}})),
        &auth,
    )
    .await;
    let result = resp.result.expect("world_create should succeed");
    let world_id = result["content"]["id"].as_i64().expect("world id in content");

    let resp = dispatch(
        &state,
        request(
            2,
            "tools/call",
            json!({"name": "area_create", "arguments": {"world_id": world_id, "name": "Tavern", "description": "dim room"}}),
        ),
        &auth,
    )
    .await;
    let result = resp.result.expect("area_create should succeed");
    assert!(!result["is_error"].as_bool().unwrap());
    let area_id = result["content"]["id"].as_i64().expect("area id in content");

    let resp = dispatch(&state, request(3, "tools/call", json!({"name": "area_get", "arguments": {"area_id": area_id}})), &auth).await;
    let result = resp.result.expect("area_get should succeed");
    assert_eq!(result["content"]["area"]["name"], "Tavern");
}

#[tokio::test]
async fn character_scoped_mutation_over_remote_requires_ownership() {
    let (_dir, state) = test_state().await;
    let local = AuthContext::local();

    let world = dispatch(
        &state,
        request(1, "tools/call", json!({"name": "world_create", "arguments": {"name": "Aeth", "description": "d"}})),
        &local,
    )
    .await
    .result
    .unwrap();
    let world_id = world["content"]["id"].as_i64().unwrap();

    let area = dispatch(
        &state,
        request(2, "tools/call", json!({"name": "area_create", "arguments": {"world_id": world_id, "name": "Tavern", "description": "d"}})),
        &local,
    )
    .await
    .result
    .unwrap();
    let area_id = area["content"]["id"].as_i64().unwrap();

    let character_id = state
        .kernel
        .character_create(
            world_id,
            "Mira",
            "human",
            "female",
            27,
            "a bard",
            "",
            Some(area_id),
            wcp_domain::entity::CharacterClass::Minor,
        )
        .await
        .unwrap();

    // Remote caller with no session token attempting a character-scoped
    // mutation is rejected before the tool runs.
    let remote_no_token = AuthContext::remote(None);
    let resp = dispatch(
        &state,
        request(3, "tools/call", json!({"name": "character_move", "arguments": {"character_id": character_id, "area_id": area_id}})),
        &remote_no_token,
    )
    .await;
    let result = resp.result.unwrap();
    assert!(result["is_error"].as_bool().unwrap());

    // Claiming the character and presenting that token allows the move.
    let token = state.sessions.claim("player-1", character_id).await.unwrap();
    let remote_with_token = AuthContext::remote(Some(token));
    let resp = dispatch(
        &state,
        request(4, "tools/call", json!({"name": "character_move", "arguments": {"character_id": character_id, "area_id": area_id}})),
        &remote_with_token,
    )
    .await;
    let result = resp.result.unwrap();
    assert!(!result["is_error"].as_bool().unwrap());
}

#[tokio::test]
async fn unknown_method_returns_rpc_error() {
    let (_dir, state) = test_state().await;
    let auth = AuthContext::local();
    let resp = dispatch(&state, request(1, "bogus/method", json!({})), &auth).await;
    assert!(resp.result.is_none());
    assert!(resp.error.is_some());
}
