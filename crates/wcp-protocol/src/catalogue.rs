//! WCP tool catalogue (`§4.4`, `§6`). Each tool is a name, a JSON-schema
//! parameter description (for `tools/list`), and an authorization profile
//! the server's policy layer consults before dispatch.

use serde_json::{json, Value};

/// Authorization profile for a tool (`§4.4`).
#[derive(Debug, Clone, Copy)]
pub struct ToolAuth {
    /// Whether the remote transport requires a valid session token at all.
    pub mutating: bool,
    /// When `Some`, the request's resolved subject character id must pass
    /// `canControl(session.player_id, subject)`. `None` means the tool
    /// targets world/area metadata only and skips the ownership check
    /// even though it mutates (`§4.4`: "unless the call targets
    /// world/area metadata only").
    pub subject_param: Option<&'static str>,
}

pub const READ_ONLY: ToolAuth = ToolAuth {
    mutating: false,
    subject_param: None,
};

pub const METADATA_MUTATION: ToolAuth = ToolAuth {
    mutating: true,
    subject_param: None,
};

pub const fn character_scoped(subject_param: &'static str) -> ToolAuth {
    ToolAuth {
        mutating: true,
        subject_param: Some(subject_param),
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub auth: ToolAuth,
}

/// The full tool inventory (`§6`). Names route by prefix: `world_*`,
/// `area_*`, `character_*`, `item_*`.
pub fn tool_catalogue() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "world_list",
            description: "List every world.",
            input_schema: json!({"type": "object", "properties": {}}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "world_get",
            description: "Fetch a world by id.",
            input_schema: json!({"type": "object", "properties": {"world_id": {"type": "integer"}}, "required": ["world_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "world_create",
            description: "Create a new world.",
            input_schema: json!({"type": "object", "properties": {"name": {"type": "string"}, "description": {"type": "string"}}, "required": ["name", "description"]}),
            auth: METADATA_MUTATION,
        },
        ToolSpec {
            name: "world_get_writing_style",
            description: "Fetch a world's writing style configuration.",
            input_schema: json!({"type": "object", "properties": {"world_id": {"type": "integer"}}, "required": ["world_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "area_list",
            description: "List the areas in a world.",
            input_schema: json!({"type": "object", "properties": {"world_id": {"type": "integer"}}, "required": ["world_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "area_get",
            description: "Fetch an area along with its characters and items.",
            input_schema: json!({"type": "object", "properties": {"area_id": {"type": "integer"}}, "required": ["area_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "area_get_characters",
            description: "List the characters currently in an area.",
            input_schema: json!({"type": "object", "properties": {"area_id": {"type": "integer"}}, "required": ["area_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "area_get_items",
            description: "List the items currently in an area.",
            input_schema: json!({"type": "object", "properties": {"area_id": {"type": "integer"}}, "required": ["area_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "area_create",
            description: "Create a new area in a world.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "world_id": {"type": "integer"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "temperature": {"type": "number"},
                    "exits": {"type": "object"}
                },
                "required": ["world_id", "name", "description"]
            }),
            auth: METADATA_MUTATION,
        },
        ToolSpec {
            name: "character_get",
            description: "Fetch a character along with its inventory.",
            input_schema: json!({"type": "object", "properties": {"character_id": {"type": "integer"}}, "required": ["character_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "character_list_awake",
            description: "List characters in a world with alertness >= 20.",
            input_schema: json!({"type": "object", "properties": {"world_id": {"type": "integer"}}, "required": ["world_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "character_move",
            description: "Move a character into another area; fires character_enters.",
            input_schema: json!({"type": "object", "properties": {"character_id": {"type": "integer"}, "area_id": {"type": "integer"}}, "required": ["character_id", "area_id"]}),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "character_speak",
            description: "Have a character speak, act, or think; fires character_speech for speech.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "character_id": {"type": "integer"},
                    "text": {"type": "string"},
                    "action_type": {"type": "string", "enum": ["speech", "action", "thought"]}
                },
                "required": ["character_id", "text", "action_type"]
            }),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "character_update_state",
            description: "Partially update a character's physiology.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "character_id": {"type": "integer"},
                    "nutrition": {"type": "number"},
                    "hydration": {"type": "number"},
                    "tiredness": {"type": "number"},
                    "alertness": {"type": "number"},
                    "damage": {"type": "array"}
                },
                "required": ["character_id"]
            }),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "character_get_inventory",
            description: "List the items a character is holding.",
            input_schema: json!({"type": "object", "properties": {"character_id": {"type": "integer"}}, "required": ["character_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "character_add_memory",
            description: "Append a memory entry to a character, enforcing the class tail cap.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "character_id": {"type": "integer"},
                    "action": {"type": "string"},
                    "result": {"type": "string"}
                },
                "required": ["character_id", "action", "result"]
            }),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "item_get",
            description: "Fetch an item by id.",
            input_schema: json!({"type": "object", "properties": {"item_id": {"type": "integer"}}, "required": ["item_id"]}),
            auth: READ_ONLY,
        },
        ToolSpec {
            name: "item_pickup",
            description: "Have a character pick up an item; fires item_picked_up.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "character_id": {"type": "integer"},
                    "item_id": {"type": "integer"},
                    "location": {"type": "string"}
                },
                "required": ["character_id", "item_id", "location"]
            }),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "item_drop",
            description: "Have a character drop a held item; fires item_dropped.",
            input_schema: json!({"type": "object", "properties": {"character_id": {"type": "integer"}, "item_id": {"type": "integer"}}, "required": ["character_id", "item_id"]}),
            auth: character_scoped("character_id"),
        },
        ToolSpec {
            name: "item_create",
            description: "Create a new item, optionally placed in an area.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "world_id": {"type": "integer"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "properties": {"type": "object"},
                    "area_id": {"type": "integer"}
                },
                "required": ["world_id", "name"]
            }),
            auth: METADATA_MUTATION,
        },
    ]
}

pub fn find(name: &str) -> Option<ToolSpec> {
    tool_catalogue().into_iter().find(|t| t.name == name)
}
