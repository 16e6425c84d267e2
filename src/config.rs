use crate::content::ContentKind;
use crate::validator::AnswerPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_SOURCE_TEXT_MAX_CHARS: usize = 12_000;
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Item-count range for one content kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl CountBounds {
    pub const fn new(min: u32, max: u32, default: u32) -> Self {
        Self { min, max, default }
    }

    /// Missing counts use the default; everything else is forced into `[min, max]`
    pub fn clamp(&self, requested: Option<i64>) -> u32 {
        match requested {
            None => self.default,
            Some(n) if n < self.min as i64 => self.min,
            Some(n) if n > self.max as i64 => self.max,
            Some(n) => n as u32,
        }
    }

    fn normalize(&mut self) {
        self.min = self.min.max(1);
        self.max = self.max.max(self.min);
        self.default = self.default.clamp(self.min, self.max);
    }
}

/// One entry of the ordered provider list. Credentials always come from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderSettings {
    pub name: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub providers: Vec<ProviderSettings>,
    pub quiz: CountBounds,
    pub flashcards: CountBounds,
    pub study_set: CountBounds,
    pub quiz_answer_policy: AnswerPolicy,
    pub study_set_answer_policy: AnswerPolicy,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u8,
    pub retry_base_delay_ms: u64,
    pub source_text_max_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            providers: ["openrouter", "groq", "gemini", "ollama"]
                .iter()
                .map(|name| ProviderSettings::named(name))
                .collect(),
            quiz: CountBounds::new(1, 50, 10),
            flashcards: CountBounds::new(1, 50, 10),
            study_set: CountBounds::new(1, 20, 5),
            quiz_answer_policy: AnswerPolicy::Drop,
            study_set_answer_policy: AnswerPolicy::Drop,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 0,
            retry_base_delay_ms: 2_000,
            source_text_max_chars: DEFAULT_SOURCE_TEXT_MAX_CHARS,
        }
    }
}

impl GeneratorConfig {
    /// Load `.env`, the optional JSON file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.normalize();

        tracing::info!(
            "Generator config loaded: providers=[{}], timeout={}s, retries={}",
            config
                .providers
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            config.timeout_secs,
            config.max_retries
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: GeneratorConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize();
        Ok(config)
    }

    pub fn bounds(&self, kind: ContentKind) -> CountBounds {
        match kind {
            ContentKind::Quiz => self.quiz,
            ContentKind::Flashcards => self.flashcards,
            ContentKind::StudySet => self.study_set,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn normalize(&mut self) {
        self.quiz.normalize();
        self.flashcards.normalize();
        self.study_set.normalize();

        if !self.temperature.is_finite() {
            self.temperature = DEFAULT_TEMPERATURE;
        }
        self.temperature = self.temperature.clamp(0.0, MAX_TEMPERATURE);

        if self.max_output_tokens == 0 {
            self.max_output_tokens = DEFAULT_MAX_OUTPUT_TOKENS;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.source_text_max_chars == 0 {
            self.source_text_max_chars = DEFAULT_SOURCE_TEXT_MAX_CHARS;
        }

        for provider in &mut self.providers {
            provider.name = provider.name.trim().to_lowercase();
            provider.model = normalize_optional(provider.model.take());
            provider.base_url = normalize_optional(provider.base_url.take());
        }
        self.providers.retain(|p| !p.name.is_empty());

        let mut seen = Vec::new();
        self.providers.retain(|p| {
            if seen.contains(&p.name) {
                false
            } else {
                seen.push(p.name.clone());
                true
            }
        });
    }

    fn apply_env(&mut self) {
        if let Some(order) = env_string("STUDYFORGE_PROVIDERS") {
            let previous = std::mem::take(&mut self.providers);
            self.providers = order
                .split(',')
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .map(|name| {
                    previous
                        .iter()
                        .find(|p| p.name == name)
                        .cloned()
                        .unwrap_or_else(|| ProviderSettings::named(&name))
                })
                .collect();
        }

        for provider in &mut self.providers {
            let prefix = provider.name.to_uppercase();
            if let Some(model) = env_string(&format!("{}_MODEL", prefix)) {
                provider.model = Some(model);
            }
            if let Some(url) = env_string(&format!("{}_URL", prefix)) {
                provider.base_url = Some(url);
            }
        }

        if let Some(v) = env_parse("STUDYFORGE_TIMEOUT_SECS") {
            self.timeout_secs = v;
        }
        if let Some(v) = env_parse("STUDYFORGE_MAX_RETRIES") {
            self.max_retries = v;
        }
        if let Some(v) = env_parse("STUDYFORGE_TEMPERATURE") {
            self.temperature = v;
        }
        if let Some(v) = env_parse("STUDYFORGE_MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = v;
        }
        if let Some(v) = env_parse("STUDYFORGE_QUIZ_ANSWER_POLICY") {
            self.quiz_answer_policy = v;
        }
        if let Some(v) = env_parse("STUDYFORGE_STUDY_SET_ANSWER_POLICY") {
            self.study_set_answer_policy = v;
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}: cannot parse '{}'", key, raw);
            None
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
