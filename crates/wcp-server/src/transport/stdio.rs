//! Line-delimited duplex stdio transport (`§4.4`): "a line-delimited
//! duplex stream for local automation". Each line of stdin is one
//! JSON-encoded [`Request`]; each line written to stdout is the matching
//! [`Response`]. Requests are dispatched concurrently — order of replies
//! is not guaranteed to match order of arrival, matching a JSON-RPC `id`
//! based client's expectations.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use wcp_protocol::envelope::{Request, Response, RpcError};

use crate::dispatch::{dispatch, AuthContext};
use crate::state::AppState;

/// Runs the stdio transport to completion (EOF on stdin). The local
/// transport is implicitly trusted: no session token is required even for
/// mutating tools (`§4.4`).
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = Arc::new(Mutex::new(tokio::io::stdout()));
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let state = state.clone();
        let stdout = stdout.clone();
        tokio::spawn(async move {
            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => dispatch(&state, request, &AuthContext::local()).await,
                Err(e) => Response::err(
                    0,
                    RpcError::new(
                        wcp_protocol::envelope::PARSE_ERROR,
                        format!("invalid JSON-RPC request: {e}"),
                    ),
                ),
            };
            write_line(&stdout, &response).await;
        });
    }
    Ok(())
}

async fn write_line(stdout: &Arc<Mutex<tokio::io::Stdout>>, response: &Response) {
    let Ok(mut text) = serde_json::to_string(response) else {
        return;
    };
    text.push('\n');
    let mut guard = stdout.lock().await;
    let _ = guard.write_all(text.as_bytes()).await;
    let _ = guard.flush().await;
}
