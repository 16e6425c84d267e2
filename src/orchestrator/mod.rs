use crate::config::GeneratorConfig;
use crate::content::{ContentKind, GenerationRequest, GenerationResult, ValidatedItem};
use crate::extract::extract;
use crate::llm::{GenerateOptions, ProviderAdapter, ProviderError, ProviderErrorKind, RawResult};
use crate::parser::{self, ParseError};
use crate::prompt_engine::{clarity, PromptBuilder, SYSTEM_INSTRUCTION};
use crate::store::{GeneratedSetStore, StoreError};
use crate::validator::{ContentValidator, ValidationError};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use self::metrics::Metrics;
use self::provider_registry::adapters_from_env;
use self::retry::RetryPolicy;
use self::router::ProviderRouter;

pub mod metrics;
pub mod provider_registry;
pub mod retry;
pub mod router;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    RequestInvalid,
    ConfigurationFailure,
    Overloaded,
    Timeout,
    ParsingFailure,
    Unknown,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationErrorKind::RequestInvalid => "Invalid request",
            GenerationErrorKind::ConfigurationFailure => "Configuration failure",
            GenerationErrorKind::Overloaded => "Provider overloaded",
            GenerationErrorKind::Timeout => "Timed out",
            GenerationErrorKind::ParsingFailure => "Unusable provider output",
            GenerationErrorKind::Unknown => "Unknown error",
        };
        f.write_str(label)
    }
}

/// The only error that leaves the pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the caller may try the same request again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GenerationErrorKind::Overloaded
                | GenerationErrorKind::Timeout
                | GenerationErrorKind::ParsingFailure
        )
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        let kind = match err.kind {
            ProviderErrorKind::AuthFailure => GenerationErrorKind::ConfigurationFailure,
            ProviderErrorKind::QuotaExceeded => GenerationErrorKind::Overloaded,
            ProviderErrorKind::Timeout => GenerationErrorKind::Timeout,
            ProviderErrorKind::Unknown => GenerationErrorKind::Unknown,
        };
        Self::new(kind, err.message)
    }
}

impl From<ParseError> for GenerationError {
    fn from(err: ParseError) -> Self {
        Self::new(GenerationErrorKind::ParsingFailure, err.to_string())
    }
}

impl From<ValidationError> for GenerationError {
    fn from(err: ValidationError) -> Self {
        Self::new(GenerationErrorKind::ParsingFailure, err.to_string())
    }
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        Self::new(GenerationErrorKind::Unknown, err.to_string())
    }
}

/// Request after topic cleanup and count clamping
struct PreparedRequest {
    topic: String,
    count: u32,
}

pub struct GenerationService {
    router: ProviderRouter,
    config: GeneratorConfig,
    prompts: PromptBuilder,
    validator: ContentValidator,
    retry: RetryPolicy,
    metrics: Mutex<Metrics>,
}

impl GenerationService {
    pub fn new(router: ProviderRouter, mut config: GeneratorConfig) -> Self {
        config.normalize();

        Self {
            prompts: PromptBuilder::new(config.source_text_max_chars),
            validator: ContentValidator::new(
                config.quiz_answer_policy,
                config.study_set_answer_policy,
            ),
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay()),
            router,
            config,
            metrics: Mutex::new(Metrics::new()),
        }
    }

    pub fn with_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>, config: GeneratorConfig) -> Self {
        Self::new(ProviderRouter::new(adapters), config)
    }

    /// Build adapters from environment credentials for the configured providers
    pub fn from_config(config: GeneratorConfig) -> Self {
        let adapters = adapters_from_env(&config);
        Self::with_adapters(adapters, config)
    }

    /// Snapshot of per-provider counters
    pub fn metrics(&self) -> Metrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let generation_id = Uuid::new_v4();
        let kind = request.content_kind;
        let prepared = self.prepare(request)?;

        let adapter = self.router.select().ok_or_else(|| {
            GenerationError::new(
                GenerationErrorKind::ConfigurationFailure,
                "No LLM provider configured",
            )
        })?;
        let provider = adapter.name().to_string();

        tracing::info!(
            generation_id = %generation_id,
            provider = %provider,
            kind = %kind,
            "Generating {} items on '{}'",
            prepared.count,
            prepared.topic
        );

        let prompt = self.prompts.build(
            kind,
            &prepared.topic,
            prepared.count,
            request.difficulty,
            request.source_text.as_deref(),
        );
        let options = GenerateOptions {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
        };

        let raw = match self.call_provider(adapter.as_ref(), &prompt, &options).await {
            Ok(raw) => raw,
            Err(e) => {
                self.record(&provider, false);
                let err = GenerationError::from(e);
                self.log_failure(generation_id, &provider, &err);
                return Err(err);
            }
        };

        match self.interpret(raw, &provider, kind, prepared.count) {
            Ok(items) => {
                self.record(&provider, true);
                let accepted_count = items.len() as u32;
                tracing::info!(
                    generation_id = %generation_id,
                    provider = %provider,
                    "Accepted {}/{} items",
                    accepted_count,
                    prepared.count
                );

                Ok(GenerationResult {
                    generation_id,
                    content_kind: kind,
                    topic: prepared.topic,
                    items,
                    provider_used: provider,
                    requested_count: prepared.count,
                    accepted_count,
                    generated_at: chrono::Utc::now().to_rfc3339(),
                })
            }
            Err(err) => {
                self.record(&provider, false);
                self.log_failure(generation_id, &provider, &err);
                Err(err)
            }
        }
    }

    /// Run the pipeline, then persist. Returns the store's identifier with the result.
    pub async fn generate_and_save(
        &self,
        request: &GenerationRequest,
        store: &dyn GeneratedSetStore,
    ) -> Result<(String, GenerationResult), GenerationError> {
        let result = self.generate(request).await?;

        let stored_id = store.save_generated_set(&result).await.map_err(|e| {
            tracing::error!(generation_id = %result.generation_id, "Failed to save generated set: {}", e);
            GenerationError::from(e)
        })?;
        Ok((stored_id, result))
    }

    fn prepare(&self, request: &GenerationRequest) -> Result<PreparedRequest, GenerationError> {
        let topic = clarity::normalize_topic(&request.topic);
        if topic.is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::RequestInvalid,
                "Topic must not be empty",
            ));
        }

        let bounds = self.config.bounds(request.content_kind);
        let count = bounds.clamp(request.item_count);
        if request.item_count.is_some_and(|n| n != count as i64) {
            tracing::debug!(
                kind = %request.content_kind,
                "Requested count {:?} clamped to {}",
                request.item_count,
                count
            );
        }

        Ok(PreparedRequest { topic, count })
    }

    async fn call_provider(
        &self,
        adapter: &dyn ProviderAdapter,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<RawResult, ProviderError> {
        let timeout = self.config.timeout();
        let mut attempt = 0u8;

        loop {
            let outcome = match tokio::time::timeout(timeout, adapter.generate(prompt, options)).await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::timeout(format!(
                    "{} did not answer within {}s",
                    adapter.name(),
                    timeout.as_secs()
                ))),
            };

            match outcome {
                Ok(raw) => return Ok(raw),
                Err(e) => {
                    tracing::warn!(
                        provider = adapter.name(),
                        "Attempt {}/{} failed: {}",
                        attempt + 1,
                        self.retry.max_retries() + 1,
                        e
                    );

                    if self.retry.should_retry(attempt, &e) {
                        self.retry.wait_before_retry(adapter.name(), attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    fn interpret(
        &self,
        raw: RawResult,
        provider: &str,
        kind: ContentKind,
        count: u32,
    ) -> Result<Vec<ValidatedItem>, GenerationError> {
        let text = extract(raw, provider);
        if text.trim().is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::ParsingFailure,
                format!("{} returned no text", provider),
            ));
        }

        let payload = parser::parse(&text)?;
        Ok(self.validator.validate(&payload, kind, count)?)
    }

    fn record(&self, provider: &str, success: bool) {
        if let Ok(mut metrics) = self.metrics.lock() {
            if success {
                metrics.record_success(provider);
            } else {
                metrics.record_failure(provider);
            }
        }
    }

    fn log_failure(&self, generation_id: Uuid, provider: &str, err: &GenerationError) {
        match err.kind {
            GenerationErrorKind::Unknown => {
                tracing::error!(generation_id = %generation_id, provider, "Generation failed: {}", err)
            }
            _ => {
                tracing::warn!(generation_id = %generation_id, provider, "Generation failed: {}", err)
            }
        }
    }
}

impl fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationService")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        let cases = [
            (ProviderErrorKind::AuthFailure, GenerationErrorKind::ConfigurationFailure),
            (ProviderErrorKind::QuotaExceeded, GenerationErrorKind::Overloaded),
            (ProviderErrorKind::Timeout, GenerationErrorKind::Timeout),
            (ProviderErrorKind::Unknown, GenerationErrorKind::Unknown),
        ];
        for (provider_kind, expected) in cases {
            let err = GenerationError::from(ProviderError::new(provider_kind, "x"));
            assert_eq!(err.kind, expected);
        }
    }

    #[test]
    fn test_retry_classes() {
        let retryable = |kind| GenerationError::new(kind, "").is_retryable();
        assert!(!retryable(GenerationErrorKind::RequestInvalid));
        assert!(!retryable(GenerationErrorKind::ConfigurationFailure));
        assert!(retryable(GenerationErrorKind::Overloaded));
        assert!(retryable(GenerationErrorKind::Timeout));
        assert!(retryable(GenerationErrorKind::ParsingFailure));
        assert!(!retryable(GenerationErrorKind::Unknown));
    }

    #[test]
    fn test_pipeline_stage_errors_are_parsing_failures() {
        assert_eq!(
            GenerationError::from(ParseError::Empty).kind,
            GenerationErrorKind::ParsingFailure
        );
        assert_eq!(
            GenerationError::from(ValidationError::NoValidItems(ContentKind::Quiz)).kind,
            GenerationErrorKind::ParsingFailure
        );
        assert_eq!(
            GenerationError::from(StoreError::Unavailable("down".into())).kind,
            GenerationErrorKind::Unknown
        );
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_selection() {
        let service = GenerationService::with_adapters(Vec::new(), GeneratorConfig::default());
        let err = service
            .generate(&GenerationRequest::new(ContentKind::Quiz, "  \n\t "))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::RequestInvalid);
    }

    #[tokio::test]
    async fn test_no_adapters_is_configuration_failure() {
        let service = GenerationService::with_adapters(Vec::new(), GeneratorConfig::default());
        let err = service
            .generate(&GenerationRequest::new(ContentKind::Flashcards, "Enzymes"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ConfigurationFailure);
    }
}
