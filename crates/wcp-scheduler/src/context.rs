//! Context Builder (`§4.6`). A pure function of a character's current
//! state, area, and inventory, producing the per-cycle prompt pair —
//! grounded on the teacher's `contextpack::builder::ContextPackBuilder`
//! shape (pre-gathered inputs in, assembled string out, no I/O inside).

use wcp_domain::entity::{Area, Character, CharacterClass, Item};

/// Fixed system prompt enumerating the accepted action shapes (`§4.6`).
const BASE_SYSTEM_PROMPT: &str = "You are role-playing a character in a simulated world. \
Respond with exactly one JSON object and nothing else. The object must have an \
\"action\" field set to one of: \"move\" (with a \"direction\" string), \"speak\" \
(with a \"text\" string), \"pickup\" (with an \"item\" string), \"drop\" (with an \
\"item\" string), \"wait\", or \"sleep\". Do not include any prose, markdown, or \
explanation outside the JSON object.";

const STORY_SUFFIX: &str = " Favor actions and dialogue that advance an ongoing narrative arc.";
const MINOR_SUFFIX: &str = " Keep actions brief and true to a background character's routine.";

/// Builds the system prompt for a character's class (`§4.6` last line).
pub fn system_prompt(class: CharacterClass) -> String {
    match class {
        CharacterClass::Story => format!("{BASE_SYSTEM_PROMPT}{STORY_SUFFIX}"),
        CharacterClass::Minor => format!("{BASE_SYSTEM_PROMPT}{MINOR_SUFFIX}"),
    }
}

/// Everything the builder needs about the world around a character,
/// pre-gathered by the cycle engine before the pure build step.
pub struct ContextInputs<'a> {
    pub character: &'a Character,
    pub area: Option<&'a Area>,
    pub others_in_area: &'a [Character],
    pub items_in_area: &'a [Item],
    pub inventory: &'a [Item],
}

/// Builds the user prompt: identity, physical state, inventory, location,
/// memory, instruction footer, in that order (`§4.6`).
pub fn user_prompt(inputs: &ContextInputs<'_>) -> String {
    let mut out = String::new();
    push_identity(&mut out, inputs.character);
    push_physical_state(&mut out, inputs.character);
    push_inventory(&mut out, inputs.inventory);
    push_location(&mut out, inputs);
    push_memory(&mut out, inputs.character);
    out.push_str("\nRespond with a single JSON action object as instructed above.");
    out
}

fn push_identity(out: &mut String, c: &Character) {
    out.push_str(&format!(
        "You are {}, a {}-year-old {} {}.\n{}\n{}\n",
        c.name, c.age, c.species, c.gender, c.description, c.backstory
    ));
    if !c.interests.is_empty() {
        out.push_str(&format!("Interests: {}.\n", c.interests.join(", ")));
    }
    if !c.likes.is_empty() {
        out.push_str(&format!("Likes: {}.\n", c.likes.join(", ")));
    }
    if !c.dislikes.is_empty() {
        out.push_str(&format!("Dislikes: {}.\n", c.dislikes.join(", ")));
    }
    if !c.beliefs.is_empty() {
        out.push_str(&format!("Beliefs: {}.\n", c.beliefs.join(", ")));
    }
    if !c.internal_conflict.is_empty() {
        out.push_str(&format!("Internal conflict: {}.\n", c.internal_conflict));
    }
}

fn push_physical_state(out: &mut String, c: &Character) {
    out.push_str("\nPhysical state:\n");
    out.push_str(&format!(
        "- Nutrition: {:.0}% ({})\n",
        c.nutrition,
        hunger_note(c.nutrition)
    ));
    out.push_str(&format!(
        "- Hydration: {:.0}% ({})\n",
        c.hydration,
        thirst_note(c.hydration)
    ));
    out.push_str(&format!(
        "- Tiredness: {:.0}% ({})\n",
        c.tiredness,
        tiredness_note(c.tiredness)
    ));
    out.push_str(&format!(
        "- Alertness: {:.0}% ({})\n",
        c.alertness,
        alertness_note(c.alertness)
    ));
    if !c.damage.is_empty() {
        let summary: Vec<String> = c
            .damage
            .iter()
            .map(|d| format!("{} ({}, {:.0}%)", d.part, d.kind, d.severity))
            .collect();
        out.push_str(&format!("- Injuries: {}\n", summary.join(", ")));
    }
}

fn hunger_note(nutrition: f64) -> &'static str {
    if nutrition < 30.0 {
        "very hungry"
    } else if nutrition < 60.0 {
        "somewhat hungry"
    } else {
        "not hungry"
    }
}

fn thirst_note(hydration: f64) -> &'static str {
    if hydration < 30.0 {
        "very thirsty"
    } else if hydration < 60.0 {
        "somewhat thirsty"
    } else {
        "not thirsty"
    }
}

fn tiredness_note(tiredness: f64) -> &'static str {
    if tiredness > 80.0 {
        "extremely tired"
    } else if tiredness > 60.0 {
        "tired"
    } else {
        "rested"
    }
}

fn alertness_note(alertness: f64) -> &'static str {
    if alertness < 20.0 {
        "asleep"
    } else if alertness < 50.0 {
        "drowsy"
    } else {
        "alert"
    }
}

fn push_inventory(out: &mut String, inventory: &[Item]) {
    let right = inventory
        .iter()
        .find(|i| i.held_location.as_deref() == Some("right hand"))
        .map(|i| i.name.as_str())
        .unwrap_or("empty");
    let left = inventory
        .iter()
        .find(|i| i.held_location.as_deref() == Some("left hand"))
        .map(|i| i.name.as_str())
        .unwrap_or("empty");
    out.push_str("\nInventory:\n");
    out.push_str(&format!("- Right hand: {right}\n"));
    out.push_str(&format!("- Left hand: {left}\n"));

    let other: Vec<String> = inventory
        .iter()
        .filter(|i| !matches!(i.held_location.as_deref(), Some("right hand") | Some("left hand")))
        .map(|i| {
            format!(
                "{} ({})",
                i.name,
                i.held_location.as_deref().unwrap_or("carried")
            )
        })
        .collect();
    if !other.is_empty() {
        out.push_str(&format!("- Also carrying: {}\n", other.join(", ")));
    }
}

fn push_location(out: &mut String, inputs: &ContextInputs<'_>) {
    out.push_str("\nLocation:\n");
    let Some(area) = inputs.area else {
        out.push_str("You are not currently in any specific location.\n");
        return;
    };
    out.push_str(&format!(
        "{} ({}°). {}\n",
        area.name, area.temperature, area.description
    ));
    if !area.exits.is_empty() {
        let mut exits: Vec<_> = area.exits.iter().collect();
        exits.sort_by_key(|(dir, _)| dir.clone());
        let rendered: Vec<String> = exits
            .iter()
            .map(|(dir, id)| format!("{dir} (to area {id})"))
            .collect();
        out.push_str(&format!("Exits: {}.\n", rendered.join(", ")));
    }
    if !inputs.others_in_area.is_empty() {
        let names: Vec<&str> = inputs.others_in_area.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("Also here: {}.\n", names.join(", ")));
    }
    if !inputs.items_in_area.is_empty() {
        let names: Vec<&str> = inputs.items_in_area.iter().map(|i| i.name.as_str()).collect();
        out.push_str(&format!("Items here: {}.\n", names.join(", ")));
    }
}

fn push_memory(out: &mut String, c: &Character) {
    out.push_str("\nRecent memory:\n");
    let cap = c.character_class.memory_cap();
    let start = c.memory.len().saturating_sub(cap);
    if c.memory.is_empty() {
        out.push_str("(none yet)\n");
        return;
    }
    for entry in &c.memory[start..] {
        out.push_str(&format!("- {} → {}\n", entry.action, entry.result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wcp_domain::entity::{CharacterClass, DamageEntry};

    fn base_character() -> Character {
        Character {
            id: 1,
            world_id: 1,
            name: "Elowen".into(),
            species: "human".into(),
            gender: "woman".into(),
            age: 34,
            description: "a weathered innkeeper".into(),
            backstory: "ran the inn after her mother passed".into(),
            memory: vec![],
            likes: vec!["quiet mornings".into()],
            dislikes: vec![],
            interests: vec![],
            beliefs: vec![],
            internal_conflict: String::new(),
            nutrition: 25.0,
            hydration: 80.0,
            tiredness: 90.0,
            alertness: 15.0,
            damage: vec![DamageEntry {
                part: "left arm".into(),
                kind: "bruise".into(),
                severity: 10.0,
            }],
            current_area_id: Some(7),
            owner_id: None,
            character_class: CharacterClass::Story,
        }
    }

    #[test]
    fn physical_state_renders_threshold_notes() {
        let c = base_character();
        let mut out = String::new();
        push_physical_state(&mut out, &c);
        assert!(out.contains("very hungry"));
        assert!(out.contains("extremely tired"));
        assert!(out.contains("asleep"));
        assert!(out.contains("left arm (bruise, 10%)"));
    }

    #[test]
    fn location_reports_not_in_area_when_none() {
        let mut c = base_character();
        c.current_area_id = None;
        let inputs = ContextInputs {
            character: &c,
            area: None,
            others_in_area: &[],
            items_in_area: &[],
            inventory: &[],
        };
        let mut out = String::new();
        push_location(&mut out, &inputs);
        assert!(out.contains("not currently in any specific location"));
    }

    #[test]
    fn location_lists_exits_others_and_items() {
        let area = Area {
            id: 7,
            world_id: 1,
            name: "The Hearth".into(),
            description: "a warm common room".into(),
            temperature: 21.0,
            exits: HashMap::from([("north".to_string(), 8)]),
            triggers: vec![],
        };
        let c = base_character();
        let other = Character {
            id: 2,
            name: "Tam".into(),
            ..base_character()
        };
        let inputs = ContextInputs {
            character: &c,
            area: Some(&area),
            others_in_area: std::slice::from_ref(&other),
            items_in_area: &[],
            inventory: &[],
        };
        let mut out = String::new();
        push_location(&mut out, &inputs);
        assert!(out.contains("north (to area 8)"));
        assert!(out.contains("Also here: Tam"));
    }

    #[test]
    fn memory_renders_only_the_class_tail_cap() {
        let mut c = base_character();
        c.character_class = CharacterClass::Minor;
        for i in 0..5 {
            c.memory.push(wcp_domain::entity::MemoryEntry {
                action: format!("did {i}"),
                result: format!("result {i}"),
                timestamp: chrono::Utc::now(),
            });
        }
        let mut out = String::new();
        push_memory(&mut out, &c);
        assert!(!out.contains("did 0"));
        assert!(out.contains("did 2"));
        assert!(out.contains("did 4"));
    }

    #[test]
    fn system_prompt_varies_by_class_suffix() {
        let story = system_prompt(CharacterClass::Story);
        let minor = system_prompt(CharacterClass::Minor);
        assert!(story.contains("narrative arc"));
        assert!(minor.contains("background character"));
    }
}
