//! Recovers a JSON object from model output that may carry fences or prose.

use serde_json::Value;

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty response text")]
    Empty,

    #[error("no JSON object recoverable: {reason}")]
    Unrecoverable { reason: String },

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

pub fn parse(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned = strip_fences(trimmed);

    let value = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => value,
        Err(direct_err) => {
            tracing::debug!("Direct JSON parse failed: {}", direct_err);
            match outermost_object(cleaned).map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => value,
                _ => {
                    return Err(ParseError::Unrecoverable {
                        reason: direct_err.to_string(),
                    })
                }
            }
        }
    };

    match value {
        Value::Object(_) => Ok(value),
        other => Err(ParseError::NotAnObject {
            found: type_name(&other),
        }),
    }
}

/// Remove one leading fence (optionally tagged `json`) and one trailing fence, only when both exist
fn strip_fences(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix(FENCE) else {
        return text;
    };
    let Some(inner) = after_open.strip_suffix(FENCE) else {
        return text;
    };

    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

/// Slice from the first `{` to the last `}`
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
