// llm/mod.rs - Provider adapter trait + shared HTTP plumbing

pub mod gemini;
pub mod groq;
pub mod ollama;
pub mod openrouter;
mod types;

pub use gemini::GeminiAdapter;
pub use groq::GroqLLMAdapter;
pub use ollama::OllamaAdapter;
pub use openrouter::OpenRouterAdapter;
pub use types::{
    Choice, ChoiceMessage, GenerateOptions, ProviderError, ProviderErrorKind, RawResult,
    TextAccessor,
};

use async_trait::async_trait;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// Trait for LLM text generation adapters
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Generate content for a prompt. One outbound call, no retries.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<RawResult, ProviderError>;

    /// Provider name
    fn name(&self) -> &str;
}

/// HTTP client built on first use and kept for the adapter's lifetime.
///
/// Concurrent first calls may both run the builder; only one result is kept and
/// both are equivalent.
pub(crate) struct LazyClient {
    cell: OnceLock<Client>,
    timeout: Duration,
}

impl LazyClient {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            cell: OnceLock::new(),
            timeout,
        }
    }

    pub(crate) fn get(&self) -> &Client {
        self.cell.get_or_init(|| {
            tracing::debug!("Building HTTP client (timeout {:?})", self.timeout);
            Client::builder()
                .timeout(self.timeout)
                .build()
                .unwrap_or_default()
        })
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Send a JSON request and return the decoded body, classifying every failure.
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_transport(provider, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(provider, status, &body));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::classify(format!("{} parse: {}", provider, e)))
}

/// Providers embed error details in 200 bodies too (`{"error": {...}}`).
pub(crate) fn embedded_error(provider: &str, body: &serde_json::Value) -> Option<ProviderError> {
    let error = body.get("error")?;
    let message = match error {
        serde_json::Value::String(text) => text.clone(),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    };
    Some(ProviderError::classify(format!("{}: {}", provider, message)))
}
