// llm/ollama.rs - Ollama local LLM adapter (streamed NDJSON)

use super::{GenerateOptions, LazyClient, ProviderAdapter, ProviderError, RawResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:7b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

pub struct OllamaAdapter {
    client: LazyClient,
    model: String,
    base_url: String,
}

impl OllamaAdapter {
    pub fn new() -> Self {
        Self {
            client: LazyClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            model: DEFAULT_MODEL.to_string(),
            base_url: OLLAMA_BASE_URL.to_string(),
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

    /// Overall HTTP timeout, covering the whole streamed body
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = LazyClient::new(timeout);
        self
    }
}

impl Default for OllamaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<RawResult, ProviderError> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: options.system_instruction.clone(),
            stream: true,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_output_tokens,
            },
        };

        let response = self
            .client
            .get()
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("ollama", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport("ollama", &e))?;

        if !status.is_success() {
            return Err(ProviderError::from_status("ollama", status, &body));
        }

        let chunks = collect_chunks(&body)?;
        if chunks.iter().all(|c| c.trim().is_empty()) {
            return Err(ProviderError::classify(format!(
                "ollama {}: empty response",
                self.model
            )));
        }

        Ok(RawResult::Chunks(chunks))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Split an NDJSON stream into its `response` fragments
fn collect_chunks(body: &str) -> Result<Vec<String>, ProviderError> {
    let mut chunks = Vec::new();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let chunk: OllamaChunk = serde_json::from_str(line)
            .map_err(|e| ProviderError::classify(format!("ollama stream: {}", e)))?;

        if let Some(error) = chunk.error {
            return Err(ProviderError::classify(format!("ollama: {}", error)));
        }
        chunks.push(chunk.response);
    }

    Ok(chunks)
}
