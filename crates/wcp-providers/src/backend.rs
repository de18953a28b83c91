//! The black-box backend interface (`§9` "LLM pluggability").

use wcp_domain::error::Result;

/// Generation options (`§4.7`). Defaults used by the scheduler:
/// `temperature=0.3, max_tokens=64, stop_strings=["}", "\n\n"]` — the
/// closing brace is a stop condition because the action must be a single
/// small JSON object.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stop_strings: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 1.0,
            max_tokens: 64,
            stop_strings: vec!["}".to_string(), "\n\n".to_string()],
        }
    }
}

/// A black-box text-completion backend: `(system, user, options) -> text`
/// (`§9`). The Router owns the backend's lifecycle; the backend exposes
/// only this prompt interface.
#[async_trait::async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String>;
}
