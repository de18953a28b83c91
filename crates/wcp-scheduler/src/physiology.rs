//! Physiology tick math (`§4.5` step 3a). Pure function of a character's
//! current state and the cycle's shared `Δt` (wall seconds) — deliberately
//! decoupled from persistence so the thresholds can be unit tested without
//! a database.

use wcp_domain::entity::{Character, CharacterStatePartial, DamageEntry};

/// Computes the partial update for one physiology tick. `delta_t` is in
/// wall-clock seconds and shared across every character in the cycle.
pub fn tick(character: &Character, delta_t: f64) -> CharacterStatePartial {
    let nutrition = character.nutrition - delta_t / 900.0;
    let hydration = character.hydration - delta_t / 600.0;

    let (tiredness, alertness) = if character.alertness < 20.0 {
        (
            character.tiredness - 5.0 * delta_t / 60.0,
            character.alertness + 5.0 * delta_t / 60.0,
        )
    } else {
        (character.tiredness + delta_t / 600.0, character.alertness)
    };

    let damage: Vec<DamageEntry> = character
        .damage
        .iter()
        .map(|d| DamageEntry {
            part: d.part.clone(),
            kind: d.kind.clone(),
            severity: d.severity - 0.5 * delta_t / 3600.0,
        })
        .filter(|d| d.severity > 0.0)
        .collect();

    CharacterStatePartial {
        nutrition: Some(nutrition),
        hydration: Some(hydration),
        tiredness: Some(tiredness),
        alertness: Some(alertness),
        damage: Some(damage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcp_domain::entity::CharacterClass;

    fn character_with(nutrition: f64, hydration: f64, tiredness: f64, alertness: f64) -> Character {
        Character {
            id: 1,
            world_id: 1,
            name: "Test".into(),
            species: "human".into(),
            gender: "nonbinary".into(),
            age: 20,
            description: String::new(),
            backstory: String::new(),
            memory: vec![],
            likes: vec![],
            dislikes: vec![],
            interests: vec![],
            beliefs: vec![],
            internal_conflict: String::new(),
            nutrition,
            hydration,
            tiredness,
            alertness,
            damage: vec![],
            current_area_id: None,
            owner_id: None,
            character_class: CharacterClass::Minor,
        }
    }

    #[test]
    fn awake_character_loses_nutrition_and_hydration_and_gains_tiredness() {
        let c = character_with(50.0, 50.0, 50.0, 80.0);
        let partial = tick(&c, 900.0);
        assert!((partial.nutrition.unwrap() - 49.0).abs() < 1e-9);
        assert!((partial.hydration.unwrap() - 48.5).abs() < 1e-9);
        assert!((partial.tiredness.unwrap() - 51.5).abs() < 1e-9);
        assert_eq!(partial.alertness.unwrap(), 80.0);
    }

    #[test]
    fn asleep_character_recovers_tiredness_and_gains_alertness() {
        let c = character_with(50.0, 50.0, 80.0, 10.0);
        let partial = tick(&c, 60.0);
        assert!((partial.tiredness.unwrap() - 75.0).abs() < 1e-9);
        assert!((partial.alertness.unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn damage_decays_and_zeroed_entries_are_dropped() {
        let mut c = character_with(50.0, 50.0, 50.0, 80.0);
        c.damage = vec![
            DamageEntry { part: "leg".into(), kind: "cut".into(), severity: 1.0 },
            DamageEntry { part: "arm".into(), kind: "bruise".into(), severity: 0.1 },
        ];
        let partial = tick(&c, 3600.0);
        let damage = partial.damage.unwrap();
        assert_eq!(damage.len(), 1);
        assert_eq!(damage[0].part, "leg");
        assert!((damage[0].severity - 0.5).abs() < 1e-9);
    }
}
