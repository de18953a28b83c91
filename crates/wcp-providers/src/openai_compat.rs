//! OpenAI-compatible HTTP backend. Works with any local-inference runtime
//! that speaks the `/v1/chat/completions` wire format (Ollama, vLLM,
//! LM Studio, llama.cpp's server mode) — grounded on the teacher's
//! `OpenAiCompatProvider` adapter shape.

use serde::{Deserialize, Serialize};
use wcp_domain::error::{Error, Result};

use crate::backend::{GenerationOptions, LlmBackend};

pub struct OpenAiCompatBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client builds");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stop: &'a [String],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait::async_trait]
impl LlmBackend for OpenAiCompatBackend {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        let body = ChatRequestBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            stop: &options.stop_strings,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Other(format!("llm request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Other(format!(
                "llm backend {url} returned {status}: {text}"
            )));
        }

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| Error::Other(format!("invalid llm response from {url}: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Other(format!("llm backend {url} returned no choices")))
    }
}
