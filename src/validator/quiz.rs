// validator/quiz.rs - Quiz question rules and answer-index normalization

use super::{coerce_text, text_field, AnswerPolicy};
use crate::content::QuizQuestion;
use serde_json::Value;

const OPTION_COUNT: usize = 4;
const QUESTION_KEYS: [&str; 2] = ["question", "questionText"];
const ANSWER_KEYS: [&str; 3] = ["correctAnswer", "correct_answer", "answer"];

/// Result of resolving a raw `correctAnswer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer resolved to a valid index
    Resolved(u8),
    /// Unresolvable answer replaced by index 0 (best-effort policy)
    Defaulted { reason: String },
    /// Unresolvable answer, item must be dropped
    Rejected { reason: String },
}

impl AnswerOutcome {
    pub fn index(&self) -> Option<u8> {
        match self {
            AnswerOutcome::Resolved(index) => Some(*index),
            AnswerOutcome::Defaulted { .. } => Some(0),
            AnswerOutcome::Rejected { .. } => None,
        }
    }
}

enum RawAnswer {
    Index(i64),
    Unmatched(String),
}

/// Resolve `raw` against `options` and apply `policy` to anything not in `0..=3`
pub fn normalize_answer(
    raw: Option<&Value>,
    options: &[String; OPTION_COUNT],
    policy: AnswerPolicy,
) -> AnswerOutcome {
    let reason = match read_answer(raw, options) {
        RawAnswer::Index(index) if (0..OPTION_COUNT as i64).contains(&index) => {
            return AnswerOutcome::Resolved(index as u8);
        }
        RawAnswer::Index(index) => format!("answer index {} out of range", index),
        RawAnswer::Unmatched(reason) => reason,
    };

    match policy {
        AnswerPolicy::BestEffort => AnswerOutcome::Defaulted { reason },
        AnswerPolicy::Drop => AnswerOutcome::Rejected { reason },
    }
}

fn read_answer(raw: Option<&Value>, options: &[String; OPTION_COUNT]) -> RawAnswer {
    match raw {
        None | Some(Value::Null) => RawAnswer::Unmatched("missing correctAnswer".to_string()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(index) => RawAnswer::Index(index),
            None => integral_index(n.as_f64(), n),
        },
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if let Ok(index) = trimmed.parse::<i64>() {
                return RawAnswer::Index(index);
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    return integral_index(Some(f), trimmed);
                }
            }
            // Exact text match first, then trimmed
            let position = options
                .iter()
                .position(|o| o == s)
                .or_else(|| options.iter().position(|o| o.trim() == s.trim()));
            match position {
                Some(index) => RawAnswer::Index(index as i64),
                None => RawAnswer::Unmatched(format!("answer '{}' not among options", s)),
            }
        }
        Some(other) => RawAnswer::Unmatched(format!("unsupported answer value {}", other)),
    }
}

/// Whole-valued floats such as `3.0` count as indices
fn integral_index(value: Option<f64>, shown: impl std::fmt::Display) -> RawAnswer {
    match value {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => RawAnswer::Index(f as i64),
        _ => RawAnswer::Unmatched(format!("non-integer answer {}", shown)),
    }
}

pub(crate) fn validate_questions(items: &[Value], policy: AnswerPolicy) -> Vec<QuizQuestion> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match validate_question(item, policy) {
            Ok(question) => Some(question),
            Err(reason) => {
                tracing::debug!(index, "Dropping quiz item: {}", reason);
                None
            }
        })
        .collect()
}

fn validate_question(item: &Value, policy: AnswerPolicy) -> Result<QuizQuestion, String> {
    let question_text = QUESTION_KEYS
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or("question text missing or not a string")?
        .to_string();

    let options = read_options(item.get("options"))?;

    let raw_answer = ANSWER_KEYS.iter().find_map(|key| item.get(*key));
    let correct_answer = match normalize_answer(raw_answer, &options, policy) {
        AnswerOutcome::Resolved(index) => index,
        AnswerOutcome::Defaulted { reason } => {
            tracing::warn!(
                question = %question_text,
                "Best-effort repair, defaulting answer to index 0: {}",
                reason
            );
            0
        }
        AnswerOutcome::Rejected { reason } => return Err(reason),
    };

    Ok(QuizQuestion {
        question_text,
        options,
        correct_answer,
        explanation: text_field(item, &["explanation"]),
    })
}

fn read_options(raw: Option<&Value>) -> Result<[String; OPTION_COUNT], String> {
    let entries = raw
        .and_then(Value::as_array)
        .ok_or("options missing or not a list")?;

    if entries.len() != OPTION_COUNT {
        return Err(format!(
            "expected {} options, found {}",
            OPTION_COUNT,
            entries.len()
        ));
    }

    let texts: Vec<String> = entries
        .iter()
        .map(coerce_text)
        .collect::<Option<_>>()
        .ok_or("blank or non-scalar option")?;

    texts
        .try_into()
        .map_err(|_| "option count changed during coercion".to_string())
}
