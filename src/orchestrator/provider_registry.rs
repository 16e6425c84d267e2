use crate::config::{GeneratorConfig, ProviderSettings};
use crate::llm::{GeminiAdapter, GroqLLMAdapter, OllamaAdapter, OpenRouterAdapter, ProviderAdapter};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Provider credentials and switches read from the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openrouter_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub ollama_enabled: bool,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            openrouter_api_key: env_key("OPENROUTER_API_KEY"),
            groq_api_key: env_key("GROQ_API_KEY").filter(|k| k.starts_with("gsk_")),
            gemini_api_key: env_key("GEMINI_API_KEY"),
            ollama_enabled: env_key("OLLAMA_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false)
                || env_key("OLLAMA_URL").is_some(),
        }
    }
}

/// Adapters in configured order, skipping providers without credentials
pub fn adapters_from_config(
    config: &GeneratorConfig,
    credentials: &Credentials,
) -> Vec<Arc<dyn ProviderAdapter>> {
    let mut adapters = Vec::new();

    for settings in &config.providers {
        match build_adapter(settings, credentials, config.timeout()) {
            Some(adapter) => {
                tracing::info!(provider = %settings.name, "Provider enabled");
                adapters.push(adapter);
            }
            None => {
                tracing::debug!(provider = %settings.name, "Provider skipped: not configured");
            }
        }
    }

    if adapters.is_empty() {
        tracing::warn!("No LLM providers configured");
    }
    adapters
}

pub fn adapters_from_env(config: &GeneratorConfig) -> Vec<Arc<dyn ProviderAdapter>> {
    adapters_from_config(config, &Credentials::from_env())
}

/// HTTP clients use the configured call timeout, so a hung provider surfaces as a
/// timeout from the adapter itself
fn build_adapter(
    settings: &ProviderSettings,
    credentials: &Credentials,
    timeout: Duration,
) -> Option<Arc<dyn ProviderAdapter>> {
    let adapter: Arc<dyn ProviderAdapter> = match settings.name.as_str() {
        "openrouter" => {
            let api_key = credentials.openrouter_api_key.clone()?;
            let mut adapter = OpenRouterAdapter::new(api_key).with_timeout(timeout);
            if let Some(model) = &settings.model {
                adapter = adapter.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                adapter = adapter.with_base_url(url);
            }
            Arc::new(adapter)
        }
        "groq" => {
            let mut adapter =
                GroqLLMAdapter::new(credentials.groq_api_key.clone()?).with_timeout(timeout);
            if let Some(model) = &settings.model {
                adapter = adapter.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                adapter = adapter.with_base_url(url);
            }
            Arc::new(adapter)
        }
        "gemini" => {
            let mut adapter =
                GeminiAdapter::new(credentials.gemini_api_key.clone()?).with_timeout(timeout);
            if let Some(model) = &settings.model {
                adapter = adapter.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                adapter = adapter.with_base_url(url);
            }
            Arc::new(adapter)
        }
        "ollama" => {
            if !credentials.ollama_enabled {
                return None;
            }
            let mut adapter = OllamaAdapter::new().with_timeout(timeout);
            if let Some(model) = &settings.model {
                adapter = adapter.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                adapter = adapter.with_base_url(url);
            }
            Arc::new(adapter)
        }
        other => {
            tracing::warn!("Unknown provider '{}' ignored", other);
            return None;
        }
    };
    Some(adapter)
}

fn env_key(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
