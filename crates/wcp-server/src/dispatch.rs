//! WCP RPC surface (`§4.4`): `initialize`, `tools/list`, `tools/call`.
//! Transport-agnostic — both the stdio and websocket transports in
//! `crate::transport` call [`dispatch`] with the same `Request` envelope.

use serde_json::{json, Value};
use std::time::Duration;

use wcp_domain::entity::{CharacterStatePartial, SpeechKind};
use wcp_domain::error::Error;
use wcp_protocol::catalogue::{self, ToolAuth};
use wcp_protocol::envelope::{Request, Response, RpcError, ToolCallResult};

use crate::state::AppState;

/// `§5`: WCP requests have a 30-second default timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies which transport a request arrived over and, for the remote
/// transport, the session token presented with it (`§4.4`).
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub remote: bool,
    pub token: Option<String>,
}

impl AuthContext {
    pub fn local() -> Self {
        Self {
            remote: false,
            token: None,
        }
    }

    pub fn remote(token: Option<String>) -> Self {
        Self {
            remote: true,
            token,
        }
    }
}

pub async fn dispatch(state: &AppState, request: Request, auth: &AuthContext) -> Response {
    let id = request.id;
    match tokio::time::timeout(REQUEST_TIMEOUT, handle(state, request, auth)).await {
        Ok(Ok(result)) => Response::ok(id, result),
        Ok(Err(rpc_err)) => Response::err(id, rpc_err),
        Err(_elapsed) => Response::err(id, RpcError::new(Error::Timeout("rpc".into()).rpc_code(), "request exceeded 30s timeout")),
    }
}

async fn handle(state: &AppState, request: Request, auth: &AuthContext) -> Result<Value, RpcError> {
    match request.method.as_str() {
        "initialize" => Ok(json!({
            "name": "world-control-protocol",
            "version": env!("CARGO_PKG_VERSION"),
            "tools": catalogue::tool_catalogue().len(),
        })),
        "tools/list" => Ok(json!({
            "tools": catalogue::tool_catalogue()
                .into_iter()
                .map(|t| json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.input_schema,
                }))
                .collect::<Vec<_>>(),
        })),
        "tools/call" => handle_tool_call(state, request.params, auth).await,
        other => Err(RpcError::new(
            wcp_protocol::envelope::METHOD_NOT_FOUND,
            format!("unknown method: {other}"),
        )),
    }
}

#[derive(serde::Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn handle_tool_call(state: &AppState, params: Option<Value>, auth: &AuthContext) -> Result<Value, RpcError> {
    let params = params.ok_or_else(|| {
        RpcError::new(wcp_protocol::envelope::INVALID_PARAMS, "tools/call requires params")
    })?;
    let call: ToolCallParams = serde_json::from_value(params).map_err(|e| {
        RpcError::new(wcp_protocol::envelope::INVALID_PARAMS, format!("invalid tools/call params: {e}"))
    })?;

    let spec = catalogue::find(&call.name).ok_or_else(|| {
        RpcError::new(
            wcp_protocol::envelope::METHOD_NOT_FOUND,
            format!("unknown tool: {}", call.name),
        )
    })?;

    if let Err(message) = authorize(state, &spec.auth, &call.arguments, auth).await {
        return Ok(json!(ToolCallResult::error(message)));
    }

    match run_tool(state, &call.name, &call.arguments).await {
        Ok(content) => Ok(json!(ToolCallResult::ok(content))),
        Err(err) => Ok(json!(ToolCallResult::error(err.to_string()))),
    }
}

/// Policy-layer authorization (`§4.4`): mutating tools invoked over the
/// remote transport need a valid session token, and — unless the tool
/// targets world/area metadata only — that session must `canControl` the
/// subject character named by `auth.subject_param`.
async fn authorize(state: &AppState, auth: &ToolAuth, arguments: &Value, ctx: &AuthContext) -> Result<(), String> {
    if !auth.mutating || !ctx.remote {
        return Ok(());
    }
    let Some(subject_param) = auth.subject_param else {
        // Metadata-only mutation: no subject character to own.
        return Ok(());
    };

    let token = ctx.token.as_deref().ok_or("missing session token")?;
    let session = state.sessions.validate(token).ok_or("invalid or expired session token")?;

    let subject_id = arguments
        .get(subject_param)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("missing required field '{subject_param}'"))?;

    let allowed = state
        .sessions
        .can_control(&session.player_id, subject_id)
        .await
        .map_err(|e| e.to_string())?;
    if !allowed {
        return Err(format!("player {} does not control character {subject_id}", session.player_id));
    }
    Ok(())
}

/// Executes one tool against the Kernel and returns its JSON payload
/// (`§6` tool catalogue).
async fn run_tool(state: &AppState, name: &str, args: &Value) -> wcp_domain::error::Result<Value> {
    let kernel = &state.kernel;

    let i64_arg = |key: &str| -> wcp_domain::error::Result<i64> {
        args.get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Validation(format!("missing or invalid '{key}'")))
    };
    let str_arg = |key: &str| -> wcp_domain::error::Result<String> {
        args.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Validation(format!("missing or invalid '{key}'")))
    };

    match name {
        "world_list" => Ok(json!(kernel.world_list().await?)),
        "world_get" => Ok(json!(kernel.world_get(i64_arg("world_id")?).await?)),
        "world_create" => {
            let id = kernel.world_create(&str_arg("name")?, &str_arg("description")?).await?;
            Ok(json!({ "id": id }))
        }
        "world_get_writing_style" => Ok(json!(kernel.world_get_writing_style(i64_arg("world_id")?).await?)),
        "area_list" => Ok(json!(kernel.area_list(i64_arg("world_id")?).await?)),
        "area_get" => {
            let area_id = i64_arg("area_id")?;
            let area = kernel.area_get(area_id).await?;
            let characters = kernel.area_get_characters(area_id).await?;
            let items = kernel.area_get_items(area_id).await?;
            Ok(json!({ "area": area, "characters": characters, "items": items }))
        }
        "area_get_characters" => Ok(json!(kernel.area_get_characters(i64_arg("area_id")?).await?)),
        "area_get_items" => Ok(json!(kernel.area_get_items(i64_arg("area_id")?).await?)),
        "area_create" => {
            let world_id = i64_arg("world_id")?;
            let area_name = str_arg("name")?;
            let description = str_arg("description")?;
            let temperature = args.get("temperature").and_then(Value::as_f64);
            let exits = args
                .get("exits")
                .and_then(Value::as_object)
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_i64().map(|id| (k.clone(), id)))
                        .collect()
                });
            let id = kernel
                .area_create(world_id, &area_name, &description, temperature, exits)
                .await?;
            Ok(json!({ "id": id }))
        }
        "character_get" => {
            let character_id = i64_arg("character_id")?;
            let character = kernel.character_get(character_id).await?;
            let inventory = kernel.character_get_inventory(character_id).await?;
            Ok(json!({ "character": character, "inventory": inventory }))
        }
        "character_list_awake" => Ok(json!(kernel.character_list_awake(i64_arg("world_id")?).await?)),
        "character_move" => {
            let character = kernel.move_character(i64_arg("character_id")?, i64_arg("area_id")?).await?;
            Ok(json!(character))
        }
        "character_speak" => {
            let character_id = i64_arg("character_id")?;
            let text = str_arg("text")?;
            let kind: SpeechKind = str_arg("action_type")?.parse()?;
            Ok(json!(kernel.speak(character_id, &text, kind).await?))
        }
        "character_update_state" => {
            let character_id = i64_arg("character_id")?;
            let partial = CharacterStatePartial {
                nutrition: args.get("nutrition").and_then(Value::as_f64),
                hydration: args.get("hydration").and_then(Value::as_f64),
                tiredness: args.get("tiredness").and_then(Value::as_f64),
                alertness: args.get("alertness").and_then(Value::as_f64),
                damage: args
                    .get("damage")
                    .map(|v| serde_json::from_value(v.clone()))
                    .transpose()?,
            };
            Ok(json!(kernel.update_state(character_id, &partial).await?))
        }
        "character_get_inventory" => Ok(json!(kernel.character_get_inventory(i64_arg("character_id")?).await?)),
        "character_add_memory" => {
            let character = kernel
                .append_memory(i64_arg("character_id")?, &str_arg("action")?, &str_arg("result")?)
                .await?;
            Ok(json!(character))
        }
        "item_get" => Ok(json!(kernel.item_get(i64_arg("item_id")?).await?)),
        "item_pickup" => {
            let item = kernel
                .pickup(i64_arg("character_id")?, i64_arg("item_id")?, &str_arg("location")?)
                .await?;
            Ok(json!(item))
        }
        "item_drop" => Ok(json!(kernel.drop(i64_arg("character_id")?, i64_arg("item_id")?).await?)),
        "item_create" => {
            let properties = args
                .get("properties")
                .and_then(Value::as_object)
                .map(|m| m.clone().into_iter().collect());
            let id = kernel
                .item_create(
                    i64_arg("world_id")?,
                    &str_arg("name")?,
                    &args.get("description").and_then(Value::as_str).unwrap_or("").to_string(),
                    properties,
                    args.get("area_id").and_then(Value::as_i64),
                )
                .await?;
            Ok(json!({ "id": id }))
        }
        other => Err(Error::Validation(format!("unrecognized tool: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_mutation_skips_auth_even_remote() {
        // world_create is METADATA_MUTATION: mutating=true, subject_param=None.
        let spec = catalogue::find("world_create").unwrap();
        assert!(spec.auth.mutating);
        assert!(spec.auth.subject_param.is_none());
    }

    #[test]
    fn character_scoped_tool_names_subject_param() {
        let spec = catalogue::find("character_move").unwrap();
        assert_eq!(spec.auth.subject_param, Some("character_id"));
    }
}
