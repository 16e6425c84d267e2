pub mod config;
pub mod content;
pub mod extract;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod prompt_engine;
pub mod store;
pub mod validator;

pub use config::{ConfigError, CountBounds, GeneratorConfig, ProviderSettings};
pub use content::{
    ContentKind, Difficulty, Flashcard, GenerationRequest, GenerationResult, QuizQuestion,
    StudySet, ValidatedItem,
};
pub use llm::{GenerateOptions, ProviderAdapter, ProviderError, ProviderErrorKind, RawResult};
pub use orchestrator::router::ProviderRouter;
pub use orchestrator::{GenerationError, GenerationErrorKind, GenerationService};
pub use store::{GeneratedSetStore, JsonDirStore, MemoryStore, StoreError};
pub use validator::{AnswerPolicy, ContentValidator, ValidationError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info";

/// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Later calls are no-ops.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
