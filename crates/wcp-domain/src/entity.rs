use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::trigger::Trigger;

/// Clamp a percentage-valued field to `[0, 100]`.
pub fn clamp_pct(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct World {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    pub world_id: i64,
    pub name: String,
    pub description: String,
    pub temperature: f64,
    /// direction label (lowercased, free-form) -> target area id
    pub exits: HashMap<String, i64>,
    pub triggers: Vec<Trigger>,
}

/// `character_class`. Controls LLM tier (`§4.7`) and memory tail cap (`§3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Story,
    Minor,
}

impl CharacterClass {
    /// Memory tail cap: 5 for story characters, 3 for minor characters.
    pub fn memory_cap(&self) -> usize {
        match self {
            CharacterClass::Story => 5,
            CharacterClass::Minor => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterClass::Story => "story",
            CharacterClass::Minor => "minor",
        }
    }
}

impl std::str::FromStr for CharacterClass {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(CharacterClass::Story),
            "minor" => Ok(CharacterClass::Minor),
            other => Err(crate::error::Error::Validation(format!(
                "unknown character_class: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub action: String,
    pub result: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageEntry {
    pub part: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    // Identity
    pub id: i64,
    pub world_id: i64,
    pub name: String,
    pub species: String,
    pub gender: String,
    pub age: i64,
    pub description: String,
    pub backstory: String,

    // Psychological
    pub memory: Vec<MemoryEntry>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub interests: Vec<String>,
    pub beliefs: Vec<String>,
    pub internal_conflict: String,

    // Physiology
    pub nutrition: f64,
    pub hydration: f64,
    pub tiredness: f64,
    pub alertness: f64,
    pub damage: Vec<DamageEntry>,

    // Location
    pub current_area_id: Option<i64>,

    // Controllability
    pub owner_id: Option<String>,
    pub character_class: CharacterClass,
}

impl Character {
    /// `§3` awake predicate.
    pub fn is_awake(&self) -> bool {
        self.alertness >= 20.0
    }

    /// Append a memory entry, enforcing the class's tail cap (`§4.1`,
    /// `§8` invariant 3). Oldest entries are dropped first.
    pub fn push_memory(&mut self, entry: MemoryEntry) {
        self.memory.push(entry);
        let cap = self.character_class.memory_cap();
        if self.memory.len() > cap {
            let excess = self.memory.len() - cap;
            self.memory.drain(0..excess);
        }
    }

    /// Apply a partial physiology update, clamping percentages and
    /// enforcing the forced-sleep rule (`§3`, `§4.1`).
    pub fn apply_state_partial(&mut self, partial: &CharacterStatePartial) {
        if let Some(v) = partial.nutrition {
            self.nutrition = clamp_pct(v);
        }
        if let Some(v) = partial.hydration {
            self.hydration = clamp_pct(v);
        }
        if let Some(v) = partial.tiredness {
            self.tiredness = clamp_pct(v);
        }
        if let Some(v) = partial.alertness {
            self.alertness = clamp_pct(v);
        }
        if let Some(ref damage) = partial.damage {
            self.damage = damage.clone();
        }
        if self.tiredness >= 100.0 {
            self.alertness = 0.0;
        }
    }
}

/// Partial update accepted by `updateState` (`§4.1`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterStatePartial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiredness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alertness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<Vec<DamageEntry>>,
}

/// `speak` kind (`§4.1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechKind {
    Speech,
    Action,
    Thought,
}

impl std::str::FromStr for SpeechKind {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speech" => Ok(SpeechKind::Speech),
            "action" => Ok(SpeechKind::Action),
            "thought" => Ok(SpeechKind::Thought),
            other => Err(crate::error::Error::Validation(format!(
                "unknown speech kind: {other}"
            ))),
        }
    }
}

impl SpeechKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechKind::Speech => "speech",
            SpeechKind::Action => "action",
            SpeechKind::Thought => "thought",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub world_id: i64,
    pub name: String,
    pub description: String,
    pub properties: HashMap<String, serde_json::Value>,
    pub current_area_id: Option<i64>,
    pub held_by_character_id: Option<i64>,
    pub held_location: Option<String>,
}

impl Item {
    /// `§3`/`§8` invariant 2: exactly one of area/holder is set.
    pub fn location_invariant_holds(&self) -> bool {
        let in_area = self.current_area_id.is_some();
        let held = self.held_by_character_id.is_some() && self.held_location.is_some();
        in_area ^ held
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WritingStyle {
    pub id: i64,
    pub world_id: i64,
    pub tone: String,
    pub point_of_view: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub player_id: String,
    pub character_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}
