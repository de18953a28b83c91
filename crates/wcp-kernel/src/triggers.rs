//! Trigger Engine (`§4.2`, `§9` "triggers as data"). A small interpreter
//! over the tagged-variant `Condition`/`Reaction` types from `wcp-domain`.
//!
//! Firing discipline: iterate the area's trigger list in order, collect
//! matches, execute their reactions in order, then drop `one_time`
//! triggers that fired. Reactions run through direct row writes rather
//! than full Kernel mutators and **never** call `fire` themselves — this
//! is what keeps a firing trigger's reactions a single quiescent layer and
//! rules out re-entrant/unbounded recursion (`§4.2`).

use sqlx::SqlitePool;

use wcp_domain::error::Result;
use wcp_domain::trigger::{Event, Reaction};
use wcp_persistence::{areas, items};

pub struct TriggerEngine {
    pool: SqlitePool,
}

impl TriggerEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fire `event` against its area's trigger list.
    pub async fn fire(&self, event: Event) -> Result<()> {
        let mut area = match areas::get(&self.pool, event.area_id).await? {
            Some(a) => a,
            // Area may have been deleted concurrently; nothing to fire against.
            None => return Ok(()),
        };

        let matched: Vec<usize> = area
            .triggers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.condition.matches(&event))
            .map(|(i, _)| i)
            .collect();

        if matched.is_empty() {
            return Ok(());
        }

        let mut one_time_indices = Vec::new();
        let mut reactions_run = 0usize;
        for &idx in &matched {
            let trigger = area.triggers[idx].clone();
            for reaction in &trigger.reactions {
                self.run_reaction(&mut area, reaction).await?;
                reactions_run += 1;
            }
            if trigger.one_time {
                one_time_indices.push(idx);
            }
        }

        let removed = !one_time_indices.is_empty();
        if removed {
            let keep: std::collections::HashSet<usize> = one_time_indices.into_iter().collect();
            let mut kept = Vec::with_capacity(area.triggers.len());
            for (i, t) in area.triggers.into_iter().enumerate() {
                if !keep.contains(&i) {
                    kept.push(t);
                }
            }
            area.triggers = kept;
        }

        areas::save(&self.pool, &area).await?;

        wcp_domain::trace::TraceEvent::TriggerFired {
            area_id: event.area_id,
            event_type: event.event_type.as_str().to_string(),
            reactions_run,
            removed,
        }
        .emit();

        Ok(())
    }

    async fn run_reaction(&self, area: &mut wcp_domain::entity::Area, reaction: &Reaction) -> Result<()> {
        match reaction {
            Reaction::AddItem { item_template } => {
                items::create(
                    &self.pool,
                    items::NewItem {
                        world_id: area.world_id,
                        name: &item_template.name,
                        description: &item_template.description,
                        properties: &item_template.properties,
                        current_area_id: Some(area.id),
                    },
                )
                .await?;
            }
            Reaction::RemoveItem { item_id } => {
                if let Some(item) = items::get(&self.pool, *item_id).await? {
                    if item.world_id == area.world_id {
                        items::delete(&self.pool, *item_id).await?;
                    }
                    // Otherwise silently skipped (`§4.2`: "must belong to
                    // this world; silently skipped otherwise").
                }
            }
            Reaction::AddExit {
                direction,
                target_area_id,
            } => {
                area.exits.insert(direction.clone(), *target_area_id);
            }
            Reaction::RemoveExit { direction } => {
                area.exits.remove(direction);
            }
            Reaction::ModifyDescription {
                new_description,
                append_description,
            } => {
                if let Some(new_desc) = new_description {
                    area.description = new_desc.clone();
                } else if let Some(suffix) = append_description {
                    area.description.push_str(suffix);
                }
            }
            Reaction::AppendDescription { text } => {
                area.description.push_str(text);
            }
            Reaction::ModifyTemperature {
                temperature,
                temperature_delta,
            } => {
                if let Some(t) = temperature {
                    area.temperature = *t;
                } else if let Some(delta) = temperature_delta {
                    area.temperature += delta;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;
    use wcp_domain::trigger::{Condition, EventType, ItemTemplate, Trigger};
    use wcp_persistence::{migrations, worlds};

    async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("t.db").display());
        let opts = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(opts).await.unwrap();
        migrations::run(&pool).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn secret_door_keyword_trigger_fires_once() {
        let (_dir, pool) = test_pool().await;
        let world_id = worlds::create(&pool, "W", "").await.unwrap();
        let area_id = areas::create(
            &pool,
            areas::NewArea {
                world_id,
                name: "Hall",
                description: "A quiet hall.".into(),
                temperature: 20.0,
                exits: Default::default(),
            },
        )
        .await
        .unwrap();

        let mut area = areas::get(&pool, area_id).await.unwrap().unwrap();
        area.triggers.push(Trigger {
            condition: Condition::Structured {
                event_type: "character_speech".into(),
                keywords: vec!["open sesame".into()],
                character_id: None,
                item_id: None,
            },
            reactions: vec![
                Reaction::AddExit {
                    direction: "secret".into(),
                    target_area_id: 42,
                },
                Reaction::AppendDescription {
                    text: "\nA secret passage opens.".into(),
                },
            ],
            one_time: true,
        });
        areas::save(&pool, &area).await.unwrap();

        let engine = TriggerEngine::new(pool.clone());
        engine
            .fire(Event {
                event_type: EventType::CharacterSpeech,
                area_id,
                character_id: Some(1),
                item_id: None,
                text: Some("Open Sesame!".into()),
            })
            .await
            .unwrap();

        let after = areas::get(&pool, area_id).await.unwrap().unwrap();
        assert_eq!(after.exits.get("secret"), Some(&42));
        assert!(after.description.ends_with("A secret passage opens."));
        assert!(after.triggers.is_empty());
    }

    #[tokio::test]
    async fn add_item_reaction_creates_item_in_firing_area() {
        let (_dir, pool) = test_pool().await;
        let world_id = worlds::create(&pool, "W", "").await.unwrap();
        let area_id = areas::create(
            &pool,
            areas::NewArea {
                world_id,
                name: "Room",
                description: "".into(),
                temperature: 20.0,
                exits: Default::default(),
            },
        )
        .await
        .unwrap();

        let mut area = areas::get(&pool, area_id).await.unwrap().unwrap();
        area.triggers.push(Trigger {
            condition: Condition::Simple("character_enters".into()),
            reactions: vec![Reaction::AddItem {
                item_template: ItemTemplate {
                    name: "Key".into(),
                    description: "a rusty key".into(),
                    properties: Default::default(),
                },
            }],
            one_time: false,
        });
        areas::save(&pool, &area).await.unwrap();

        let engine = TriggerEngine::new(pool.clone());
        engine
            .fire(Event {
                event_type: EventType::CharacterEnters,
                area_id,
                character_id: Some(7),
                item_id: None,
                text: None,
            })
            .await
            .unwrap();

        let items_here = items::list_for_area(&pool, area_id).await.unwrap();
        assert_eq!(items_here.len(), 1);
        assert_eq!(items_here[0].name, "Key");

        // Not one-time: the trigger survives.
        let after = areas::get(&pool, area_id).await.unwrap().unwrap();
        assert_eq!(after.triggers.len(), 1);
    }
}
