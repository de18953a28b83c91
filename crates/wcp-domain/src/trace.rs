use serde::Serialize;

/// Structured trace events emitted across the world simulator crates.
///
/// Each variant is serialized to JSON and logged as a single `tracing`
/// event (`trace_event` field) so operators can grep/aggregate without
/// parsing free-text log lines.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    CycleStarted {
        world_id: i64,
        cycle: u64,
        eligible_count: usize,
    },
    CycleCompleted {
        world_id: i64,
        cycle: u64,
        duration_ms: u64,
        actions_attempted: u64,
        actions_succeeded: u64,
        actions_failed: u64,
    },
    ActionExecuted {
        character_id: i64,
        action: String,
        outcome: String,
    },
    TriggerFired {
        area_id: i64,
        event_type: String,
        reactions_run: usize,
        removed: bool,
    },
    SessionClaimed {
        player_id: String,
        character_id: i64,
        reused: bool,
    },
    SessionReleased {
        character_id: i64,
    },
    SessionExpired {
        token_prefix: String,
        character_id: i64,
    },
    LlmRequest {
        tier: String,
        character_id: i64,
        duration_ms: u64,
        prompt_chars: usize,
        completion_chars: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wcp_event");
    }
}
