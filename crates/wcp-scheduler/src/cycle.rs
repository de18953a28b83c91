//! Agent Scheduler / Cycle Engine (`§4.5`). Drives one world: a fixed-delay
//! loop that, per cycle, ticks physiology, builds context, calls the LLM
//! Router, parses the response, and validates/executes the resulting
//! action against the kernel. Never holds a transaction open across the
//! LLM call (`§5`): physiology and action execution each go through their
//! own kernel mutator, which opens and commits its own transaction.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use wcp_domain::action::{parse_action, SchedulerAction};
use wcp_domain::entity::{Character, CharacterStatePartial};
use wcp_domain::error::{Error, Result};
use wcp_domain::trace::TraceEvent;
use wcp_kernel::Kernel;
use wcp_providers::LlmRouter;

use crate::context::{self, ContextInputs};
use crate::physiology;
use crate::stats::{SchedulerStats, SchedulerStatsSnapshot};

pub struct CycleEngine {
    kernel: Arc<Kernel>,
    router: Arc<LlmRouter>,
    world_id: i64,
    last_cycle: Mutex<Option<Instant>>,
    cycle_count: Mutex<u64>,
    stats: SchedulerStats,
}

impl CycleEngine {
    pub fn new(kernel: Arc<Kernel>, router: Arc<LlmRouter>, world_id: i64) -> Self {
        Self {
            kernel,
            router,
            world_id,
            last_cycle: Mutex::new(None),
            cycle_count: Mutex::new(0),
            stats: SchedulerStats::default(),
        }
    }

    pub fn stats(&self) -> SchedulerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Runs a single cycle to completion (`§4.5` steps 1-3).
    pub async fn run_cycle(&self) -> Result<()> {
        let started = Instant::now();
        let delta_t = {
            let mut last = self.last_cycle.lock().await;
            let dt = last.map(|prev| started.duration_since(prev).as_secs_f64()).unwrap_or(0.0);
            *last = Some(started);
            dt
        };

        let cycle = {
            let mut count = self.cycle_count.lock().await;
            *count += 1;
            *count
        };

        let eligible = self.kernel.character_list_eligible(self.world_id).await?;
        TraceEvent::CycleStarted {
            world_id: self.world_id,
            cycle,
            eligible_count: eligible.len(),
        }
        .emit();

        let mut attempted = 0u64;
        let mut succeeded = 0u64;
        let mut failed = 0u64;

        for character in eligible {
            let character_id = character.id;
            match self.process_character(character, delta_t).await {
                Ok(true) => {
                    attempted += 1;
                    succeeded += 1;
                }
                Ok(false) => {
                    // Character went back to sleep mid-tick or otherwise had
                    // no action attempted; not counted as an attempt.
                }
                Err(err) => {
                    attempted += 1;
                    failed += 1;
                    tracing::warn!(character_id, error = %err, "scheduler cycle: character processing failed");
                }
            }
        }

        self.stats.record_cycle(attempted, started.elapsed().as_millis() as u64);
        for _ in 0..succeeded {
            self.stats.record_action(true);
        }
        for _ in 0..failed {
            self.stats.record_action(false);
        }

        TraceEvent::CycleCompleted {
            world_id: self.world_id,
            cycle,
            duration_ms: started.elapsed().as_millis() as u64,
            actions_attempted: attempted,
            actions_succeeded: succeeded,
            actions_failed: failed,
        }
        .emit();

        Ok(())
    }

    /// Ticks physiology, builds context, generates and executes one
    /// character's action. Returns `Ok(true)` if an action was attempted.
    async fn process_character(&self, character: Character, delta_t: f64) -> Result<bool> {
        let partial = physiology::tick(&character, delta_t);
        let character = self.kernel.update_state(character.id, &partial).await?;

        if !character.is_awake() {
            // Forced asleep by the tick itself; nothing to generate this cycle.
            return Ok(false);
        }

        let (area, others, items_in_area) = self.area_context(&character).await?;
        let inventory = self.kernel.character_get_inventory(character.id).await?;

        let inputs = ContextInputs {
            character: &character,
            area: area.as_ref(),
            others_in_area: &others,
            items_in_area: &items_in_area,
            inventory: &inventory,
        };
        let system_prompt = context::system_prompt(character.character_class);
        let user_prompt = context::user_prompt(&inputs);

        let completion = self
            .router
            .generate(character.character_class, character.id, &system_prompt, &user_prompt)
            .await?;

        let action = parse_action(&completion)?;
        self.execute_action(&character, action).await?;
        Ok(true)
    }

    async fn area_context(
        &self,
        character: &Character,
    ) -> Result<(Option<wcp_domain::entity::Area>, Vec<Character>, Vec<wcp_domain::entity::Item>)> {
        let Some(area_id) = character.current_area_id else {
            return Ok((None, vec![], vec![]));
        };
        let area = self.kernel.area_get(area_id).await?;
        let mut others = self.kernel.area_get_characters(area_id).await?;
        others.retain(|c| c.id != character.id);
        let items = self.kernel.area_get_items(area_id).await?;
        Ok((Some(area), others, items))
    }

    /// Validates and executes a parsed action (`§4.5` "Action shapes").
    async fn execute_action(&self, character: &Character, action: SchedulerAction) -> Result<()> {
        let character_id = character.id;
        let (action_tag, outcome) = match action {
            SchedulerAction::Move { direction } => {
                let area_id = character
                    .current_area_id
                    .ok_or_else(|| Error::NoArea(format!("character {character_id} has no area")))?;
                let area = self.kernel.area_get(area_id).await?;
                let target = area.exits.get(&direction).copied().ok_or_else(|| {
                    Error::NotHere(format!("no exit '{direction}' from area {area_id}"))
                })?;
                self.kernel.move_character(character_id, target).await?;
                ("move", format!("moved {direction}"))
            }
            SchedulerAction::Speak { text } => {
                self.kernel
                    .speak(character_id, &text, wcp_domain::entity::SpeechKind::Speech)
                    .await?;
                ("speak", "spoke".to_string())
            }
            SchedulerAction::Pickup { item } => {
                let area_id = character
                    .current_area_id
                    .ok_or_else(|| Error::NoArea(format!("character {character_id} has no area")))?;
                let candidates = self.kernel.area_get_items(area_id).await?;
                let needle = item.to_lowercase();
                let found = candidates
                    .iter()
                    .find(|i| i.name.to_lowercase().contains(&needle))
                    .ok_or_else(|| Error::NotFound(format!("no item matching '{item}' in area")))?;

                let held = self.kernel.character_get_inventory(character_id).await?;
                let right_free = !held.iter().any(|i| i.held_location.as_deref() == Some("right hand"));
                let left_free = !held.iter().any(|i| i.held_location.as_deref() == Some("left hand"));
                let location = if right_free {
                    "right hand"
                } else if left_free {
                    "left hand"
                } else {
                    return Err(Error::BothHandsFull);
                };
                self.kernel.pickup(character_id, found.id, location).await?;
                ("pickup", format!("picked up {}", found.name))
            }
            SchedulerAction::Drop { item } => {
                let held = self.kernel.character_get_inventory(character_id).await?;
                let needle = item.to_lowercase();
                let found = held
                    .iter()
                    .find(|i| i.name.to_lowercase().contains(&needle))
                    .ok_or_else(|| Error::NotHolding(format!("not holding anything matching '{item}'")))?;
                self.kernel.drop(character_id, found.id).await?;
                ("drop", format!("dropped {}", found.name))
            }
            SchedulerAction::Wait => {
                self.kernel
                    .append_memory(character_id, "waited", "time passed")
                    .await?;
                ("wait", "waited".to_string())
            }
            SchedulerAction::Sleep => {
                let partial = CharacterStatePartial {
                    alertness: Some(0.0),
                    ..Default::default()
                };
                self.kernel.update_state(character_id, &partial).await?;
                ("sleep", "went to sleep".to_string())
            }
        };

        TraceEvent::ActionExecuted {
            character_id,
            action: action_tag.to_string(),
            outcome,
        }
        .emit();
        Ok(())
    }
}
