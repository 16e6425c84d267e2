use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use studyforge::{
    ContentKind, Difficulty, GenerationRequest, GenerationService, GeneratorConfig, JsonDirStore,
};

/// Generate a quiz, flashcards or a study set with the configured LLM providers
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Content kind: quiz, flashcards or study-set
    #[arg(short, long)]
    kind: ContentKind,

    /// Topic to generate content about
    #[arg(short, long)]
    topic: String,

    /// Number of items (clamped to the kind's bounds)
    #[arg(short, long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// easy, medium or hard
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Reference material to ground the content in
    #[arg(long)]
    source_file: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the result to `<dir>/<generation_id>.json`
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    studyforge::init_tracing();
    let args = Args::parse();

    let config = match GeneratorConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut request = GenerationRequest::new(args.kind, args.topic);
    request.item_count = args.count;
    request.difficulty = args.difficulty;
    if let Some(path) = &args.source_file {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => request.source_text = Some(text),
            Err(e) => {
                tracing::error!("Cannot read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let service = GenerationService::from_config(config);

    let outcome = match &args.save_dir {
        Some(dir) => service
            .generate_and_save(&request, &JsonDirStore::new(dir))
            .await
            .map(|(_, result)| result),
        None => service.generate(&request).await,
    };

    match outcome {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Failed to serialize result: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(retryable = e.is_retryable(), "{}", e);
            ExitCode::FAILURE
        }
    }
}
