//! Scheduler action shapes (`§4.5`) parsed from language-model output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SchedulerAction {
    Move { direction: String },
    Speak { text: String },
    Pickup { item: String },
    Drop { item: String },
    Wait,
    Sleep,
}

/// Extract the first `{...}` JSON object from a language-model completion,
/// tolerating a missing trailing `}` (the generation is stop-string-bounded
/// on `"}"`, so the closing brace is frequently cut off) (`§4.5`, scenario 6).
pub fn extract_first_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut end = None;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        let c = b as char;
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    match end {
        Some(e) => Some(text[start..=e].to_string()),
        // Tolerate truncated trailing brace: close it off ourselves.
        None => Some(format!("{}}}", &text[start..])),
    }
}

/// Parse a language-model action. Returns `ParseError` when no JSON object
/// with an `action` field can be found, `UnknownAction` when the `action`
/// field doesn't match one of the accepted shapes.
pub fn parse_action(text: &str) -> crate::error::Result<SchedulerAction> {
    let candidate = extract_first_json_object(text)
        .ok_or_else(|| crate::error::Error::ParseError("no JSON object found".into()))?;

    let value: serde_json::Value = serde_json::from_str(&candidate)
        .or_else(|_| {
            // Try once more after appending a closing brace — handles the
            // case where the stop string truncated inside the last value.
            serde_json::from_str(&format!("{candidate}}}"))
        })
        .map_err(|e| crate::error::Error::ParseError(format!("invalid JSON: {e}")))?;

    let action_name = value
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| crate::error::Error::ParseError("missing action field".into()))?;

    match action_name {
        "move" => {
            let direction = value
                .get("direction")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_lowercase();
            Ok(SchedulerAction::Move { direction })
        }
        "speak" => {
            let text = value
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(SchedulerAction::Speak { text })
        }
        "pickup" => {
            let item = value
                .get("item")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(SchedulerAction::Pickup { item })
        }
        "drop" => {
            let item = value
                .get("item")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(SchedulerAction::Drop { item })
        }
        "wait" => Ok(SchedulerAction::Wait),
        "sleep" => Ok(SchedulerAction::Sleep),
        other => Err(crate::error::Error::UnknownAction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_speak_action() {
        let action = parse_action(r#"{"action":"speak","text":"Hello"}"#).unwrap();
        assert_eq!(
            action,
            SchedulerAction::Speak {
                text: "Hello".into()
            }
        );
    }

    #[test]
    fn tolerates_missing_trailing_brace() {
        // `§8` scenario 6: stop string cuts the closing brace.
        let action = parse_action(r#"{"action":"speak","text":"Hello""#).unwrap();
        assert_eq!(
            action,
            SchedulerAction::Speak {
                text: "Hello".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_action() {
        let err = parse_action(r#"{"action":"fly"}"#).unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownAction(_)));
    }

    #[test]
    fn rejects_text_with_no_json() {
        let err = parse_action("I think I'll just sit here.").unwrap_err();
        assert!(matches!(err, crate::error::Error::ParseError(_)));
    }

    #[test]
    fn extracts_first_object_ignoring_trailing_text() {
        let extracted =
            extract_first_json_object(r#"{"action":"wait"} ignore this trailing chatter"#)
                .unwrap();
        assert_eq!(extracted, r#"{"action":"wait"}"#);
    }

    #[test]
    fn move_direction_is_lowercased() {
        let action = parse_action(r#"{"action":"move","direction":"NORTH"}"#).unwrap();
        assert_eq!(
            action,
            SchedulerAction::Move {
                direction: "north".into()
            }
        );
    }
}
