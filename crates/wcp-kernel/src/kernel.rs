//! Kernel mutators (`§4.1`). Every mutator below runs inside a single
//! sqlite transaction; on any failure the transaction is dropped
//! (uncommitted) and the caller sees a typed `Error`, never a partial
//! write.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

use wcp_domain::entity::{
    Character, CharacterClass, CharacterStatePartial, Item, MemoryEntry, SpeechKind, World,
    WritingStyle,
};
use wcp_domain::error::{Error, Result};
use wcp_domain::trigger::{Event, EventType};
use wcp_persistence::{areas, characters, items, styles, worlds};

use crate::triggers::TriggerEngine;

/// Sole writer to the persistence adapter for mutating operations
/// (`§4.1`). Holds the pool directly; the [`TriggerEngine`] it owns shares
/// the same pool so reactions commit through ordinary row writes.
pub struct Kernel {
    pool: SqlitePool,
    triggers: TriggerEngine,
}

impl Kernel {
    pub fn new(pool: SqlitePool) -> Self {
        let triggers = TriggerEngine::new(pool.clone());
        Self { pool, triggers }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn triggers(&self) -> &TriggerEngine {
        &self.triggers
    }

    // ── World ──────────────────────────────────────────────────────

    pub async fn world_list(&self) -> Result<Vec<World>> {
        worlds::list(&self.pool).await
    }

    pub async fn world_get(&self, id: i64) -> Result<World> {
        worlds::get(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("world {id}")))
    }

    pub async fn world_create(&self, name: &str, description: &str) -> Result<i64> {
        worlds::create(&self.pool, name, description).await
    }

    pub async fn world_get_writing_style(&self, world_id: i64) -> Result<WritingStyle> {
        styles::get_for_world(&self.pool, world_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("writing style for world {world_id}")))
    }

    // ── Area ───────────────────────────────────────────────────────

    pub async fn area_list(&self, world_id: i64) -> Result<Vec<wcp_domain::entity::Area>> {
        areas::list_for_world(&self.pool, world_id).await
    }

    pub async fn area_get(&self, id: i64) -> Result<wcp_domain::entity::Area> {
        areas::get(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("area {id}")))
    }

    pub async fn area_get_characters(&self, area_id: i64) -> Result<Vec<Character>> {
        characters::list_for_area(&self.pool, area_id).await
    }

    pub async fn area_get_items(&self, area_id: i64) -> Result<Vec<Item>> {
        items::list_for_area(&self.pool, area_id).await
    }

    pub async fn area_create(
        &self,
        world_id: i64,
        name: &str,
        description: &str,
        temperature: Option<f64>,
        exits: Option<HashMap<String, i64>>,
    ) -> Result<i64> {
        areas::create(
            &self.pool,
            areas::NewArea {
                world_id,
                name,
                description,
                temperature: temperature.unwrap_or(20.0),
                exits: exits.unwrap_or_default(),
            },
        )
        .await
    }

    // ── Character ──────────────────────────────────────────────────

    pub async fn character_get(&self, id: i64) -> Result<Character> {
        characters::get(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {id}")))
    }

    pub async fn character_list_awake(&self, world_id: i64) -> Result<Vec<Character>> {
        characters::list_awake(&self.pool, world_id).await
    }

    pub async fn character_list_eligible(&self, world_id: i64) -> Result<Vec<Character>> {
        characters::list_eligible(&self.pool, world_id).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn character_create(
        &self,
        world_id: i64,
        name: &str,
        species: &str,
        gender: &str,
        age: i64,
        description: &str,
        backstory: &str,
        current_area_id: Option<i64>,
        character_class: CharacterClass,
    ) -> Result<i64> {
        characters::create(
            &self.pool,
            characters::NewCharacter {
                world_id,
                name,
                species,
                gender,
                age,
                description,
                backstory,
                likes: &[],
                dislikes: &[],
                interests: &[],
                beliefs: &[],
                internal_conflict: "",
                current_area_id,
                character_class,
            },
        )
        .await
    }

    pub async fn character_get_inventory(&self, character_id: i64) -> Result<Vec<Item>> {
        items::list_held_by(&self.pool, character_id).await
    }

    /// `appendMemory` (`§4.1`). Enforces the class tail cap and stamps the
    /// entry with the current time.
    pub async fn append_memory(&self, character_id: i64, action: &str, result: &str) -> Result<Character> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        character.push_memory(MemoryEntry {
            action: action.to_string(),
            result: result.to_string(),
            timestamp: Utc::now(),
        });
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;
        Ok(character)
    }

    /// `updateState` (`§4.1`). Clamps percentages and enforces the
    /// forced-sleep rule; never emits trigger events.
    pub async fn update_state(
        &self,
        character_id: i64,
        partial: &CharacterStatePartial,
    ) -> Result<Character> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        character.apply_state_partial(partial);
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;
        Ok(character)
    }

    /// `speak` (`§4.1`). Emits `character_speech` after commit when
    /// `kind == Speech` and the character has an area.
    pub async fn speak(&self, character_id: i64, text: &str, kind: SpeechKind) -> Result<Character> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        character.push_memory(MemoryEntry {
            action: format!("{}: {text}", kind.as_str()),
            result: "communicated".to_string(),
            timestamp: Utc::now(),
        });
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;

        if kind == SpeechKind::Speech {
            if let Some(area_id) = character.current_area_id {
                self.triggers
                    .fire(Event {
                        event_type: EventType::CharacterSpeech,
                        area_id,
                        character_id: Some(character_id),
                        item_id: None,
                        text: Some(text.to_string()),
                    })
                    .await?;
            }
        }
        Ok(character)
    }

    /// `moveCharacter` (`§4.1`). Does **not** consult the source area's
    /// `exits` — gating belongs to the caller (scheduler validator / player
    /// session command), not the kernel, so narrator/trigger-driven
    /// teleport is always possible.
    pub async fn move_character(&self, character_id: i64, target_area_id: i64) -> Result<Character> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        let target = areas::get(&mut *tx, target_area_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("area {target_area_id}")))?;
        if target.world_id != character.world_id {
            return Err(Error::CrossWorld(format!(
                "character {character_id} (world {}) cannot move to area {target_area_id} (world {})",
                character.world_id, target.world_id
            )));
        }

        character.current_area_id = Some(target_area_id);
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;

        self.triggers
            .fire(Event {
                event_type: EventType::CharacterEnters,
                area_id: target_area_id,
                character_id: Some(character_id),
                item_id: None,
                text: None,
            })
            .await?;
        Ok(character)
    }

    // ── Item ───────────────────────────────────────────────────────

    pub async fn item_get(&self, id: i64) -> Result<Item> {
        items::get(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {id}")))
    }

    pub async fn item_create(
        &self,
        world_id: i64,
        name: &str,
        description: &str,
        properties: Option<HashMap<String, serde_json::Value>>,
        area_id: Option<i64>,
    ) -> Result<i64> {
        let properties = properties.unwrap_or_default();
        items::create(
            &self.pool,
            items::NewItem {
                world_id,
                name,
                description,
                properties: &properties,
                current_area_id: area_id,
            },
        )
        .await
    }

    /// `pickup` (`§4.1`).
    pub async fn pickup(&self, character_id: i64, item_id: i64, hold_location: &str) -> Result<Item> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        let item = items::get(&mut *tx, item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {item_id}")))?;

        let Some(character_area) = character.current_area_id else {
            return Err(Error::NoArea(format!("character {character_id} has no area")));
        };
        if item.current_area_id != Some(character_area) {
            return Err(Error::NotHere(format!(
                "item {item_id} is not in character {character_id}'s area"
            )));
        }
        if hold_location == "right hand" || hold_location == "left hand" {
            let held = characters::list_held_by(&mut *tx, character_id).await?;
            if held.iter().any(|i| i.held_location.as_deref() == Some(hold_location)) {
                return Err(Error::SlotOccupied(format!(
                    "character {character_id} already holds something in {hold_location}"
                )));
            }
        }

        items::set_held(&mut *tx, item_id, character_id, hold_location).await?;
        character.push_memory(MemoryEntry {
            action: format!("picked up {}", item.name),
            result: format!("now holding in {hold_location}"),
            timestamp: Utc::now(),
        });
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;

        self.triggers
            .fire(Event {
                event_type: EventType::ItemPickedUp,
                area_id: character_area,
                character_id: Some(character_id),
                item_id: Some(item_id),
                text: None,
            })
            .await?;

        items::get(&self.pool, item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {item_id}")))
    }

    /// `drop` (`§4.1`).
    pub async fn drop(&self, character_id: i64, item_id: i64) -> Result<Item> {
        let mut tx = self.pool.begin().await?;
        let mut character = characters::get(&mut *tx, character_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("character {character_id}")))?;
        let item = items::get(&mut *tx, item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {item_id}")))?;

        if item.held_by_character_id != Some(character_id) {
            return Err(Error::NotHolding(format!(
                "character {character_id} is not holding item {item_id}"
            )));
        }
        let Some(character_area) = character.current_area_id else {
            return Err(Error::NoArea(format!("character {character_id} has no area")));
        };

        items::set_area(&mut *tx, item_id, character_area).await?;
        character.push_memory(MemoryEntry {
            action: format!("dropped {}", item.name),
            result: "left in area".to_string(),
            timestamp: Utc::now(),
        });
        characters::save(&mut *tx, &character).await?;
        tx.commit().await?;

        self.triggers
            .fire(Event {
                event_type: EventType::ItemDropped,
                area_id: character_area,
                character_id: Some(character_id),
                item_id: Some(item_id),
                text: None,
            })
            .await?;

        items::get(&self.pool, item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {item_id}")))
    }
}
