// llm/groq.rs - Groq LLM adapter (chat completions)

use super::{
    embedded_error, send_json, Choice, GenerateOptions, LazyClient, ProviderAdapter,
    ProviderError, RawResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

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

pub struct GroqLLMAdapter {
    client: LazyClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqLLMAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: LazyClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GROQ_BASE_URL.to_string(),
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

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = LazyClient::new(timeout);
        self
    }
}

fn chat_messages(prompt: &str, options: &GenerateOptions) -> Vec<Message> {
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
    messages
}

#[async_trait]
impl ProviderAdapter for GroqLLMAdapter {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<RawResult, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: chat_messages(prompt, options),
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
        };

        let body = send_json(
            "groq",
            self.client
                .get()
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        if let Some(err) = embedded_error("groq", &body) {
            return Err(err);
        }

        let chat: ChatResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::classify(format!("groq parse: {}", e)))?;

        Ok(RawResult::Choices(chat.choices))
    }

    fn name(&self) -> &str {
        "groq"
    }
}
