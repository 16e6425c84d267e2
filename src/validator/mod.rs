// validator/mod.rs - Semantic validation and repair of parsed model output
//
// Invalid items are dropped, valid ones kept. The call fails only when the
// expected top-level collection is absent or nothing survives.

mod flashcards;
mod quiz;
mod study_set;

pub use quiz::{normalize_answer, AnswerOutcome};

use crate::content::{ContentKind, ValidatedItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// What to do with a quiz answer that cannot be resolved to an index in `0..=3`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AnswerPolicy {
    /// Keep the item with index 0 and log a warning
    BestEffort,
    /// Drop the item
    #[default]
    Drop,
}

impl FromStr for AnswerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "besteffort" => Ok(AnswerPolicy::BestEffort),
            "drop" => Ok(AnswerPolicy::Drop),
            other => Err(format!("unknown answer policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payload has no '{0}' field")]
    MissingCollection(&'static str),

    #[error("no valid {0} items survived validation")]
    NoValidItems(ContentKind),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentValidator {
    quiz_policy: AnswerPolicy,
    study_set_policy: AnswerPolicy,
}

impl ContentValidator {
    pub fn new(quiz_policy: AnswerPolicy, study_set_policy: AnswerPolicy) -> Self {
        Self {
            quiz_policy,
            study_set_policy,
        }
    }

    /// Validate `payload` for `kind`, keeping at most `max_items` per collection
    pub fn validate(
        &self,
        payload: &Value,
        kind: ContentKind,
        max_items: u32,
    ) -> Result<Vec<ValidatedItem>, ValidationError> {
        let limit = max_items as usize;

        let items: Vec<ValidatedItem> = match kind {
            ContentKind::Quiz => {
                let raw = collection(payload, &["questions", "quiz"])
                    .ok_or(ValidationError::MissingCollection("questions"))?;
                let mut questions = quiz::validate_questions(raw, self.quiz_policy);
                truncate(&mut questions, limit, kind);
                questions.into_iter().map(ValidatedItem::Quiz).collect()
            }
            ContentKind::Flashcards => {
                let raw = collection(payload, &["flashcards", "cards"])
                    .ok_or(ValidationError::MissingCollection("flashcards"))?;
                let mut cards = flashcards::validate_cards(raw);
                truncate(&mut cards, limit, kind);
                flashcards::renumber(&mut cards);
                cards.into_iter().map(ValidatedItem::Flashcard).collect()
            }
            ContentKind::StudySet => vec![ValidatedItem::StudySet(
                study_set::validate_study_set(payload, self.study_set_policy, limit)?,
            )],
        };

        if items.is_empty() {
            return Err(ValidationError::NoValidItems(kind));
        }
        Ok(items)
    }
}

/// First key holding an array
pub(crate) fn collection<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a [Value]> {
    keys.iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

pub(crate) fn truncate<T>(items: &mut Vec<T>, limit: usize, kind: ContentKind) {
    if items.len() > limit {
        tracing::debug!(
            kind = %kind,
            "Discarding {} surplus items beyond requested {}",
            items.len() - limit,
            limit
        );
        items.truncate(limit);
    }
}

/// Strings and scalars become trimmed text; blanks, nulls and containers do not
pub(crate) fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First of `keys` present on `item` that coerces to non-blank text
pub(crate) fn text_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(coerce_text)
}
