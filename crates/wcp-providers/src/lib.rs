//! LLM Router (`§4.7`, `§2` ~5% share).
//!
//! Two logical tiers (`minor`, `story`) selected by `CharacterClass`. The
//! router is a thin prompt interface over a pluggable [`LlmBackend`]:
//! models are black boxes the backend owns the lifecycle of (`§9`
//! "LLM pluggability"). Ships two concrete backends — an OpenAI-compatible
//! HTTP backend for real local inference, and a deterministic stub for
//! tests — mirroring the teacher's provider-adapter-behind-a-trait shape.

mod backend;
mod openai_compat;
mod stub;

pub use backend::{GenerationOptions, LlmBackend};
pub use openai_compat::OpenAiCompatBackend;
pub use stub::StubBackend;

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

use wcp_domain::entity::CharacterClass;
use wcp_domain::error::Result;
use wcp_domain::trace::TraceEvent;

/// Factory used to lazily construct a tier's backend on first use
/// (`§4.7`: "Lazy-loads each tier on first use").
pub type BackendFactory = Arc<dyn Fn() -> Arc<dyn LlmBackend> + Send + Sync>;

/// Tier-selecting router (`§4.7`). Holds one lazily-initialized backend
/// handle per `CharacterClass`.
pub struct LlmRouter {
    minor_factory: BackendFactory,
    story_factory: BackendFactory,
    minor: OnceCell<Arc<dyn LlmBackend>>,
    story: OnceCell<Arc<dyn LlmBackend>>,
    defaults: GenerationOptions,
}

impl LlmRouter {
    pub fn new(minor_factory: BackendFactory, story_factory: BackendFactory, defaults: GenerationOptions) -> Self {
        Self {
            minor_factory,
            story_factory,
            minor: OnceCell::new(),
            story: OnceCell::new(),
            defaults,
        }
    }

    async fn backend_for(&self, tier: CharacterClass) -> Arc<dyn LlmBackend> {
        match tier {
            CharacterClass::Minor => {
                self.minor
                    .get_or_init(|| {
                        let factory = self.minor_factory.clone();
                        async move { factory() }
                    })
                    .await
                    .clone()
            }
            CharacterClass::Story => {
                self.story
                    .get_or_init(|| {
                        let factory = self.story_factory.clone();
                        async move { factory() }
                    })
                    .await
                    .clone()
            }
        }
    }

    /// Generate an action completion for a character in the given tier
    /// (`§4.5` step c, `§4.7` defaults). Emits a `TraceEvent::LlmRequest`.
    pub async fn generate(
        &self,
        tier: CharacterClass,
        character_id: i64,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let backend = self.backend_for(tier).await;
        let started = Instant::now();
        let completion = backend
            .generate(system_prompt, user_prompt, &self.defaults)
            .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        TraceEvent::LlmRequest {
            tier: tier.as_str().to_string(),
            character_id,
            duration_ms,
            prompt_chars: system_prompt.len() + user_prompt.len(),
            completion_chars: completion.len(),
        }
        .emit();

        Ok(completion)
    }
}
