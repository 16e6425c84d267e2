// llm/openrouter.rs - OpenRouter LLM adapter

use super::{
    embedded_error, send_json, Choice, GenerateOptions, LazyClient, ProviderAdapter,
    ProviderError, RawResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528:free";
const DEFAULT_TIMEOUT_SECS: u64 = 45;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

pub struct OpenRouterAdapter {
    client: LazyClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: LazyClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overall HTTP timeout; replaces the client if it was not built yet
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = LazyClient::new(timeout);
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<RawResult, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_instruction {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
        };

        let body = send_json(
            "openrouter",
            self.client
                .get()
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("X-Title", "studyforge")
                .json(&request),
        )
        .await?;

        if let Some(err) = embedded_error("openrouter", &body) {
            return Err(err);
        }

        let chat: ChatResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::classify(format!("openrouter parse: {}", e)))?;

        Ok(RawResult::Choices(chat.choices))
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
