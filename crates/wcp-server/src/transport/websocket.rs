//! Message-framed websocket transport (`§4.4`): "a message-framed socket
//! for remote clients". The session token presented on connect (query
//! param `token`) authenticates every `tools/call` sent over that socket
//! for its lifetime.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use wcp_protocol::envelope::{Request, Response, RpcError};

use crate::dispatch::{dispatch, AuthContext};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// `GET /ws?token=<session token>` — upgrade to a WCP websocket
/// connection.
pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, token: Option<String>) {
    let auth = AuthContext::remote(token);
    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings/pongs/binary are not part of the WCP envelope contract.
            _ => continue,
        };

        let response = match serde_json::from_str::<Request>(&text) {
            Ok(request) => dispatch(&state, request, &auth).await,
            Err(e) => Response::err(
                0,
                RpcError::new(
                    wcp_protocol::envelope::PARSE_ERROR,
                    format!("invalid JSON-RPC request: {e}"),
                ),
            ),
        };

        let Ok(payload) = serde_json::to_string(&response) else {
            continue;
        };
        if sender.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }
}
