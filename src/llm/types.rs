// llm/types.rs - Provider contract types

use serde::Deserialize;
use std::fmt;

/// Per-call generation options handed to every adapter
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_instruction: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 4096,
            system_instruction: None,
        }
    }
}

/// Lazily evaluated text accessor, as exposed by SDK-style response objects
pub type TextAccessor = Box<dyn FnOnce() -> Result<String, String> + Send>;

/// One entry of an OpenAI-style `choices` list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Whatever envelope a provider returned. Only the extractor looks inside.
pub enum RawResult {
    Deferred(TextAccessor),
    Choices(Vec<Choice>),
    Text(String),
    Chunks(Vec<String>),
    Envelope(serde_json::Value),
}

impl fmt::Debug for RawResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawResult::Deferred(_) => f.write_str("Deferred(..)"),
            RawResult::Choices(choices) => write!(f, "Choices({} entries)", choices.len()),
            RawResult::Text(text) => write!(f, "Text({} chars)", text.len()),
            RawResult::Chunks(chunks) => write!(f, "Chunks({} parts)", chunks.len()),
            RawResult::Envelope(_) => f.write_str("Envelope(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AuthFailure,
    QuotaExceeded,
    Timeout,
    Unknown,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderErrorKind::AuthFailure => "auth failure",
            ProviderErrorKind::QuotaExceeded => "quota exceeded",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

const AUTH_PHRASES: &[&str] = &["api key", "unauthorized"];
const QUOTA_PHRASES: &[&str] = &["quota", "too many requests"];

/// Classified adapter failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    /// Infer the kind from provider error text
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();

        let kind = if AUTH_PHRASES.iter().any(|p| lowered.contains(p)) {
            ProviderErrorKind::AuthFailure
        } else if QUOTA_PHRASES.iter().any(|p| lowered.contains(p)) {
            ProviderErrorKind::QuotaExceeded
        } else {
            ProviderErrorKind::Unknown
        };

        Self { kind, message }
    }

    /// Classify a non-success HTTP response. Status wins over body text.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("{} {}: {}", provider, status, body);
        match status.as_u16() {
            401 | 403 => Self::new(ProviderErrorKind::AuthFailure, message),
            429 => Self::new(ProviderErrorKind::QuotaExceeded, message),
            408 | 504 => Self::new(ProviderErrorKind::Timeout, message),
            _ => Self::classify(message),
        }
    }

    /// Classify a transport error
    pub fn from_transport(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("{}: {}", provider, err))
        } else {
            Self::classify(format!("{}: {}", provider, err))
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::Timeout | ProviderErrorKind::QuotaExceeded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_phrases() {
        let err = ProviderError::classify("Invalid API Key provided");
        assert_eq!(err.kind, ProviderErrorKind::AuthFailure);

        let err = ProviderError::classify("401 Unauthorized");
        assert_eq!(err.kind, ProviderErrorKind::AuthFailure);
    }

    #[test]
    fn test_classify_quota_phrases() {
        let err = ProviderError::classify("You exceeded your current QUOTA");
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);

        let err = ProviderError::classify("Too Many Requests, slow down");
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_classify_unknown_keeps_message() {
        let err = ProviderError::classify("connection reset by peer");
        assert_eq!(err.kind, ProviderErrorKind::Unknown);
        assert_eq!(err.message, "connection reset by peer");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_takes_precedence_over_text() {
        let err = ProviderError::from_status("groq", reqwest::StatusCode::TOO_MANY_REQUESTS, "{}");
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);
        assert!(err.is_retryable());

        let err = ProviderError::from_status("groq", reqwest::StatusCode::FORBIDDEN, "quota");
        assert_eq!(err.kind, ProviderErrorKind::AuthFailure);

        let err = ProviderError::from_status(
            "gemini",
            reqwest::StatusCode::BAD_REQUEST,
            "API key not valid. Please pass a valid API key.",
        );
        assert_eq!(err.kind, ProviderErrorKind::AuthFailure);
    }
}
