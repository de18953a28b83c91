//! Deterministic stub backend (`§9`: "a real local-inference backend and a
//! deterministic stub for tests"). Serves a pre-loaded queue of
//! completions in order, recycling the last one once the queue drains, so
//! scheduler-cycle tests can assert on exact character actions.

use std::collections::VecDeque;
use tokio::sync::Mutex;

use wcp_domain::error::Result;

use crate::backend::{GenerationOptions, LlmBackend};

pub struct StubBackend {
    queue: Mutex<VecDeque<String>>,
    default_response: String,
}

impl StubBackend {
    /// A backend that always returns `default_response` (e.g. `{"action":"wait"}`).
    pub fn constant(default_response: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_response: default_response.into(),
        }
    }

    /// A backend that serves `responses` in order, then falls back to
    /// repeating the last one.
    pub fn scripted(responses: Vec<String>) -> Self {
        let default_response = responses
            .last()
            .cloned()
            .unwrap_or_else(|| r#"{"action":"wait"}"#.to_string());
        Self {
            queue: Mutex::new(responses.into()),
            default_response,
        }
    }
}

#[async_trait::async_trait]
impl LlmBackend for StubBackend {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String> {
        let mut queue = self.queue.lock().await;
        Ok(queue.pop_front().unwrap_or_else(|| self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_backend_serves_in_order_then_repeats_last() {
        let backend = StubBackend::scripted(vec![
            r#"{"action":"wait"}"#.to_string(),
            r#"{"action":"sleep"}"#.to_string(),
        ]);
        let options = GenerationOptions::default();
        assert_eq!(
            backend.generate("", "", &options).await.unwrap(),
            r#"{"action":"wait"}"#
        );
        assert_eq!(
            backend.generate("", "", &options).await.unwrap(),
            r#"{"action":"sleep"}"#
        );
        assert_eq!(
            backend.generate("", "", &options).await.unwrap(),
            r#"{"action":"sleep"}"#
        );
    }
}
