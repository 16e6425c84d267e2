//! Normalizes provider envelopes into plain text.
//!
//! Precedence, for tagged results and JSON envelopes alike: deferred text
//! accessor, then choice list, then a plain string field, then the whole
//! envelope serialized. Failures degrade to an empty string.

use crate::llm::{Choice, RawResult};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const TEXT_FIELDS: [&str; 4] = ["text", "response", "content", "output_text"];

pub fn extract(raw: RawResult, provider: &str) -> String {
    let text = match raw {
        RawResult::Deferred(accessor) => match accessor() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(provider, "Deferred text accessor failed: {}", e);
                String::new()
            }
        },
        RawResult::Choices(choices) => first_choice_text(&choices).unwrap_or_default(),
        RawResult::Text(text) => text,
        RawResult::Chunks(chunks) => chunks.concat(),
        RawResult::Envelope(value) => envelope_text(&value),
    };

    let cleaned = strip_reasoning(&text);
    if cleaned.trim().is_empty() {
        tracing::warn!(provider, "Provider response contained no text");
    } else {
        tracing::debug!(provider, chars = cleaned.len(), "Extracted response text");
    }
    cleaned
}

fn first_choice_text(choices: &[Choice]) -> Option<String> {
    choices
        .iter()
        .filter_map(|c| {
            c.message
                .as_ref()
                .and_then(|m| m.content.clone())
                .or_else(|| c.text.clone())
        })
        .find(|text| !text.trim().is_empty())
}

fn envelope_text(value: &Value) -> String {
    if let Value::String(text) = value {
        return text.clone();
    }

    if let Some(text) = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| json_choices_text(choices))
    {
        return text;
    }

    if let Some(text) = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates_text(candidates))
    {
        return text;
    }

    if let Some(text) = TEXT_FIELDS
        .iter()
        .filter_map(|field| value.get(*field).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
    {
        return text.to_string();
    }

    serde_json::to_string(value).unwrap_or_default()
}

fn json_choices_text(choices: &[Value]) -> Option<String> {
    choices
        .iter()
        .filter_map(|choice| {
            choice
                .pointer("/message/content")
                .and_then(Value::as_str)
                .or_else(|| choice.get("text").and_then(Value::as_str))
        })
        .find(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Gemini-style `candidates[].content.parts[].text`; parts of one candidate are joined
fn candidates_text(candidates: &[Value]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let parts = candidate.pointer("/content/parts")?.as_array()?;
        let joined: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    })
}

/// Reasoning models prepend `<think>...</think>`, which may itself contain braces
fn strip_reasoning(text: &str) -> String {
    static THINK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = THINK_RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").ok());

    match re {
        Some(re) if text.contains("<think>") => re.replace_all(text, "").trim().to_string(),
        _ => text.to_string(),
    }
}
