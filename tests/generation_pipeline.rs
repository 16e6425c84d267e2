use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use studyforge::llm::{Choice, ChoiceMessage};
use studyforge::{
    AnswerPolicy, ContentKind, GenerateOptions, GeneratedSetStore, GenerationErrorKind,
    GenerationRequest, GenerationResult, GenerationService, GeneratorConfig, MemoryStore,
    ProviderAdapter, ProviderError, ProviderErrorKind, RawResult, StoreError,
};

type Reply = Result<RawResult, ProviderError>;

/// Adapter that replays queued replies and records every prompt it receives
struct ScriptedAdapter {
    name: &'static str,
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedAdapter {
    fn new(name: &'static str, replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            name,
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Reply {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::new(ProviderErrorKind::Unknown, "script exhausted")))
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct FailingStore;

#[async_trait]
impl GeneratedSetStore for FailingStore {
    async fn save_generated_set(&self, _result: &GenerationResult) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

fn service(adapters: Vec<Arc<ScriptedAdapter>>, config: GeneratorConfig) -> GenerationService {
    GenerationService::with_adapters(
        adapters
            .into_iter()
            .map(|a| a as Arc<dyn ProviderAdapter>)
            .collect(),
        config,
    )
}

fn question(i: usize) -> Value {
    json!({
        "question": format!("Question {}?", i),
        "options": ["alpha", "beta", "gamma", "delta"],
        "correctAnswer": i % 4,
        "explanation": "Because."
    })
}

fn quiz_text(n: usize) -> String {
    json!({"questions": (0..n).map(question).collect::<Vec<_>>()}).to_string()
}

fn text(body: String) -> Reply {
    Ok(RawResult::Text(body))
}

#[tokio::test]
async fn fenced_quiz_is_accepted() {
    let adapter = ScriptedAdapter::new("groq", vec![text(format!("```json\n{}\n```", quiz_text(3)))]);
    let service = service(vec![adapter.clone()], GeneratorConfig::default());

    let request = GenerationRequest::new(ContentKind::Quiz, "  The   French Revolution ").with_count(3);
    let result = service.generate(&request).await.unwrap();

    assert_eq!(result.provider_used, "groq");
    assert_eq!(result.topic, "The French Revolution");
    assert_eq!(result.requested_count, 3);
    assert_eq!(result.accepted_count as usize, result.items.len());
    assert_eq!(result.accepted_count, 3);
    assert_eq!(result.items[2].as_quiz().unwrap().correct_answer, 2);
    assert!(chrono::DateTime::parse_from_rfc3339(&result.generated_at).is_ok());
    assert_eq!(service.metrics().success_count("groq"), 1);
}

#[tokio::test]
async fn oversized_count_is_clamped_in_prompt_and_validation() {
    let adapter = ScriptedAdapter::new("gemini", vec![text(quiz_text(60))]);
    let service = service(vec![adapter.clone()], GeneratorConfig::default());

    let request = GenerationRequest::new(ContentKind::Quiz, "Algebra").with_count(1000);
    let result = service.generate(&request).await.unwrap();

    assert_eq!(result.requested_count, 50);
    assert_eq!(result.accepted_count, 50);
    assert!(adapter.prompts()[0].contains("exactly 50 items"));
}

#[tokio::test]
async fn accepted_count_never_exceeds_request() {
    let reply = json!({"questions": [
        question(0),
        {"question": "broken", "options": ["a", "b"], "correctAnswer": 0},
        question(2),
        question(3),
    ]});
    let adapter = ScriptedAdapter::new("groq", vec![text(reply.to_string())]);
    let service = service(vec![adapter], GeneratorConfig::default());

    let result = service
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Geometry").with_count(2))
        .await
        .unwrap();
    assert!(result.accepted_count >= 1);
    assert!(result.accepted_count <= result.requested_count);
    assert_eq!(result.accepted_count, 2);
}

#[tokio::test]
async fn quota_error_is_overloaded() {
    let adapter = ScriptedAdapter::new(
        "openrouter",
        vec![Err(ProviderError::classify("Daily quota exhausted for this key"))],
    );
    let service = service(vec![adapter], GeneratorConfig::default());

    let err = service
        .generate(&GenerationRequest::new(ContentKind::Flashcards, "Kanji"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::Overloaded);
    assert!(err.is_retryable());
    assert_eq!(service.metrics().failure_count("openrouter"), 1);
}

#[tokio::test]
async fn auth_error_is_configuration_failure() {
    let adapter = ScriptedAdapter::new(
        "gemini",
        vec![Err(ProviderError::classify("API key not valid. Please pass a valid API key."))],
    );
    let service = service(vec![adapter], GeneratorConfig::default());

    let err = service
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Optics"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::ConfigurationFailure);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn sequential_requests_rotate_providers() {
    let first = ScriptedAdapter::new("groq", vec![text(quiz_text(1))]);
    let second = ScriptedAdapter::new("gemini", vec![text(quiz_text(1))]);
    let service = service(vec![first.clone(), second.clone()], GeneratorConfig::default());

    let request = GenerationRequest::new(ContentKind::Quiz, "Rotation").with_count(1);
    let a = service.generate(&request).await.unwrap();
    let b = service.generate(&request).await.unwrap();

    assert_ne!(a.provider_used, b.provider_used);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn failure_does_not_fail_over_to_next_provider() {
    // A fresh router starts at index 1
    let healthy = ScriptedAdapter::new("groq", vec![text(quiz_text(1))]);
    let failing = ScriptedAdapter::new("gemini", vec![Err(ProviderError::classify("boom"))]);
    let service = service(vec![healthy.clone(), failing], GeneratorConfig::default());

    let err = service
        .generate(&GenerationRequest::new(ContentKind::Quiz, "No failover"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::Unknown);
    assert_eq!(healthy.calls(), 0);
}

#[tokio::test]
async fn empty_text_is_parsing_failure() {
    let empty_choices = Ok(RawResult::Choices(vec![Choice {
        message: Some(ChoiceMessage {
            content: Some("   ".to_string()),
        }),
        text: None,
    }]));
    let failed_accessor = Ok(RawResult::Deferred(Box::new(|| Err("stream reset".to_string()))));
    let adapter = ScriptedAdapter::new("groq", vec![empty_choices, failed_accessor]);
    let service = service(vec![adapter], GeneratorConfig::default());

    for _ in 0..2 {
        let err = service
            .generate(&GenerationRequest::new(ContentKind::Quiz, "Silence"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ParsingFailure);
        assert!(err.message.contains("no text"), "{}", err.message);
    }
}

#[tokio::test]
async fn unparseable_or_empty_payload_is_parsing_failure() {
    let adapter = ScriptedAdapter::new(
        "ollama",
        vec![
            text("I'm sorry, I cannot help with that.".to_string()),
            text(json!({"questions": []}).to_string()),
        ],
    );
    let service = service(vec![adapter], GeneratorConfig::default());
    let request = GenerationRequest::new(ContentKind::Quiz, "Refusals");

    for _ in 0..2 {
        let err = service.generate(&request).await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ParsingFailure);
    }
}

#[tokio::test]
async fn answer_policy_is_configurable() {
    let reply = json!({"questions": [
        question(0),
        {"question": "Lost city?", "options": ["Rome", "Troy", "Ur", "Uruk"], "correctAnswer": "Atlantis"}
    ]})
    .to_string();

    let strict = service(
        vec![ScriptedAdapter::new("groq", vec![text(reply.clone())])],
        GeneratorConfig::default(),
    );
    let strict_result = strict
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Cities").with_count(2))
        .await
        .unwrap();
    assert_eq!(strict_result.accepted_count, 1);

    let mut lenient_config = GeneratorConfig::default();
    lenient_config.quiz_answer_policy = AnswerPolicy::BestEffort;
    let lenient = service(
        vec![ScriptedAdapter::new("groq", vec![text(reply)])],
        lenient_config,
    );
    let lenient_result = lenient
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Cities").with_count(2))
        .await
        .unwrap();
    assert_eq!(lenient_result.accepted_count, 2);
    assert_eq!(lenient_result.items[1].as_quiz().unwrap().correct_answer, 0);
}

#[tokio::test]
async fn study_set_yields_single_item() {
    let reply = json!({
        "title": "Photosynthesis",
        "summary": "Plants turn light into chemical energy.",
        "flashcards": [
            {"front": "Chlorophyll", "back": "Pigment that absorbs light"},
            {"front": "Stomata", "back": "Leaf pores"},
            {"front": "Glucose", "back": "Product sugar"}
        ],
        "quiz": [question(1)]
    });
    let adapter = ScriptedAdapter::new("gemini", vec![Ok(RawResult::Envelope(json!({
        "candidates": [{"content": {"parts": [{"text": reply.to_string()}]}}]
    })))]);
    let service = service(vec![adapter], GeneratorConfig::default());

    let result = service
        .generate(&GenerationRequest::new(ContentKind::StudySet, "Photosynthesis").with_count(2))
        .await
        .unwrap();

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.accepted_count, 1);
    let set = result.items[0].as_study_set().unwrap();
    assert_eq!(set.flashcards.len(), 2);
    assert_eq!(set.quiz.len(), 1);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mut config = GeneratorConfig::default();
    config.timeout_secs = 1;
    let service = service(vec![ScriptedAdapter::slow("ollama", Duration::from_secs(5))], config);

    let err = service
        .generate(&GenerationRequest::new(ContentKind::Flashcards, "Patience"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::Timeout);
}

#[tokio::test]
async fn transient_error_retried_on_same_provider_when_enabled() {
    let adapter = ScriptedAdapter::new(
        "groq",
        vec![
            Err(ProviderError::new(ProviderErrorKind::QuotaExceeded, "429 Too Many Requests")),
            text(quiz_text(2)),
        ],
    );
    let mut config = GeneratorConfig::default();
    config.max_retries = 1;
    config.retry_base_delay_ms = 1;
    let service = service(vec![adapter.clone()], config);

    let result = service
        .generate(&GenerationRequest::new(ContentKind::Quiz, "Retries").with_count(2))
        .await
        .unwrap();
    assert_eq!(result.accepted_count, 2);
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn generate_and_save_persists_result() {
    let adapter = ScriptedAdapter::new("groq", vec![text(quiz_text(2))]);
    let service = service(vec![adapter], GeneratorConfig::default());
    let store = MemoryStore::new();

    let (id, result) = service
        .generate_and_save(&GenerationRequest::new(ContentKind::Quiz, "Storage"), &store)
        .await
        .unwrap();

    assert_eq!(id, result.generation_id.to_string());
    assert_eq!(store.get(&id).unwrap().accepted_count, result.accepted_count);
}

#[tokio::test]
async fn store_failure_is_unknown() {
    let adapter = ScriptedAdapter::new("groq", vec![text(quiz_text(1))]);
    let service = service(vec![adapter], GeneratorConfig::default());

    let err = service
        .generate_and_save(&GenerationRequest::new(ContentKind::Quiz, "Storage"), &FailingStore)
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::Unknown);
}
