//! Trigger Engine data model (`§4.2`).
//!
//! Triggers are serialized data, not code: a condition form and a list of
//! reaction forms, both modeled as tagged/untagged serde enums so area
//! config JSON deserializes directly into the interpreter's input.

use serde::{Deserialize, Serialize};

/// Event types the Trigger Engine matches against (`§4.2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CharacterEnters,
    CharacterSpeech,
    ItemPickedUp,
    ItemDropped,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CharacterEnters => "character_enters",
            EventType::CharacterSpeech => "character_speech",
            EventType::ItemPickedUp => "item_picked_up",
            EventType::ItemDropped => "item_dropped",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "character_enters" => Ok(EventType::CharacterEnters),
            "character_speech" => Ok(EventType::CharacterSpeech),
            "item_picked_up" => Ok(EventType::ItemPickedUp),
            "item_dropped" => Ok(EventType::ItemDropped),
            _ => Err(()),
        }
    }
}

/// A fired event, carried from the Kernel into the Trigger Engine after
/// commit (`§4.1`, `§9` reactive event bus note).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub area_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Condition form (`§4.2`). Accepts either a bare event-type string or a
/// structured object with optional keyword/entity filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Simple(String),
    Structured {
        #[serde(rename = "type")]
        event_type: String,
        #[serde(default)]
        keywords: Vec<String>,
        #[serde(default)]
        character_id: Option<i64>,
        #[serde(default)]
        item_id: Option<i64>,
    },
}

impl Condition {
    /// Evaluate this condition against a fired event.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Condition::Simple(type_str) => type_str == event.event_type.as_str(),
            Condition::Structured {
                event_type,
                keywords,
                character_id,
                item_id,
            } => {
                if event_type != event.event_type.as_str() {
                    return false;
                }
                if !keywords.is_empty() {
                    if event.event_type != EventType::CharacterSpeech {
                        return false;
                    }
                    let text = event.text.as_deref().unwrap_or("").to_lowercase();
                    let any_match = keywords
                        .iter()
                        .any(|kw| text.contains(&kw.to_lowercase()));
                    if !any_match {
                        return false;
                    }
                }
                if let Some(cid) = character_id {
                    if event.character_id != Some(*cid) {
                        return false;
                    }
                }
                if let Some(iid) = item_id {
                    if event.item_id != Some(*iid) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// Reaction form (`§4.2`). Tagged on `type` so area config JSON maps
/// directly to variants; `append_description` is additionally accepted
/// as a standalone variant for compatibility (`§9` open question).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reaction {
    AddItem {
        item_template: ItemTemplate,
    },
    RemoveItem {
        item_id: i64,
    },
    AddExit {
        direction: String,
        target_area_id: i64,
    },
    RemoveExit {
        direction: String,
    },
    ModifyDescription {
        #[serde(default)]
        new_description: Option<String>,
        #[serde(default)]
        append_description: Option<String>,
    },
    /// Standalone alias for `ModifyDescription { append_description }`.
    AppendDescription {
        text: String,
    },
    ModifyTemperature {
        #[serde(default)]
        temperature: Option<f64>,
        #[serde(default)]
        temperature_delta: Option<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: std::collections::HashMap<String, serde_json::Value>,
}

/// A trigger record stored inside `Area.triggers` (`§4.2`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub condition: Condition,
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub one_time: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_condition_matches_event_type() {
        let cond = Condition::Simple("character_enters".into());
        let ev = Event {
            event_type: EventType::CharacterEnters,
            area_id: 1,
            character_id: Some(2),
            item_id: None,
            text: None,
        };
        assert!(cond.matches(&ev));
    }

    #[test]
    fn keyword_condition_is_case_insensitive() {
        let cond = Condition::Structured {
            event_type: "character_speech".into(),
            keywords: vec!["open sesame".into()],
            character_id: None,
            item_id: None,
        };
        let ev = Event {
            event_type: EventType::CharacterSpeech,
            area_id: 1,
            character_id: Some(2),
            item_id: None,
            text: Some("Open Sesame!".into()),
        };
        assert!(cond.matches(&ev));
    }

    #[test]
    fn keyword_condition_rejects_non_speech_event() {
        let cond = Condition::Structured {
            event_type: "character_speech".into(),
            keywords: vec!["open sesame".into()],
            character_id: None,
            item_id: None,
        };
        let ev = Event {
            event_type: EventType::CharacterEnters,
            area_id: 1,
            character_id: None,
            item_id: None,
            text: None,
        };
        assert!(!cond.matches(&ev));
    }

    #[test]
    fn append_description_standalone_alias_deserializes() {
        let json = r#"{"type":"append_description","text":"\nA secret passage opens."}"#;
        let reaction: Reaction = serde_json::from_str(json).unwrap();
        match reaction {
            Reaction::AppendDescription { text } => {
                assert_eq!(text, "\nA secret passage opens.")
            }
            _ => panic!("wrong variant"),
        }
    }
}
