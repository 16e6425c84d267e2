// validator/study_set.rs - Composite study set: summary plus nested cards and quiz

use super::{collection, flashcards, quiz, text_field, truncate, AnswerPolicy, ValidationError};
use crate::content::{ContentKind, StudySet};
use serde_json::Value;

pub(crate) fn validate_study_set(
    payload: &Value,
    policy: AnswerPolicy,
    limit: usize,
) -> Result<StudySet, ValidationError> {
    let summary = payload
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingCollection("summary"))?
        .to_string();

    let mut cards = collection(payload, &["flashcards", "cards"])
        .map(flashcards::validate_cards)
        .unwrap_or_default();
    truncate(&mut cards, limit, ContentKind::Flashcards);
    flashcards::renumber(&mut cards);

    let mut questions = collection(payload, &["quiz", "questions"])
        .map(|raw| quiz::validate_questions(raw, policy))
        .unwrap_or_default();
    truncate(&mut questions, limit, ContentKind::Quiz);

    if cards.is_empty() && questions.is_empty() {
        return Err(ValidationError::NoValidItems(ContentKind::StudySet));
    }

    Ok(StudySet {
        title: text_field(payload, &["title"]),
        summary,
        script: text_field(payload, &["script"]),
        flashcards: cards,
        quiz: questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "title": " Plate Tectonics ",
            "summary": "Earth's lithosphere is split into moving plates.",
            "script": "Today we look at how continents drift.",
            "flashcards": [
                {"front": "Subduction", "back": "One plate sinks beneath another"},
                {"front": "", "back": "dropped"},
                {"front": "Rift", "back": "Where plates pull apart"}
            ],
            "quiz": [
                {"question": "Fastest plate?", "options": ["Pacific", "Eurasian", "African", "Antarctic"], "correctAnswer": "Pacific"},
                {"question": "Unknown answer", "options": ["a", "b", "c", "d"], "correctAnswer": "e"}
            ]
        })
    }

    #[test]
    fn test_valid_study_set() {
        let set = validate_study_set(&payload(), AnswerPolicy::Drop, 10).unwrap();
        assert_eq!(set.title.as_deref(), Some("Plate Tectonics"));
        assert_eq!(set.flashcards.len(), 2);
        assert_eq!(set.flashcards[1].card_number, 2);
        assert_eq!(set.quiz.len(), 1);
        assert_eq!(set.quiz[0].correct_answer, 0);
    }

    #[test]
    fn test_nested_quiz_honours_policy() {
        let set = validate_study_set(&payload(), AnswerPolicy::BestEffort, 10).unwrap();
        assert_eq!(set.quiz.len(), 2);
        assert_eq!(set.quiz[1].correct_answer, 0);
    }

    #[test]
    fn test_nested_lists_truncated_to_limit() {
        let set = validate_study_set(&payload(), AnswerPolicy::BestEffort, 1).unwrap();
        assert_eq!(set.flashcards.len(), 1);
        assert_eq!(set.quiz.len(), 1);
    }

    #[test]
    fn test_blank_summary_is_missing() {
        let mut raw = payload();
        raw["summary"] = json!("   ");
        assert_eq!(
            validate_study_set(&raw, AnswerPolicy::Drop, 10),
            Err(ValidationError::MissingCollection("summary"))
        );
    }

    #[test]
    fn test_no_nested_survivors_fails() {
        let raw = json!({"summary": "Only a summary", "flashcards": [{"front": "x"}]});
        assert_eq!(
            validate_study_set(&raw, AnswerPolicy::Drop, 10),
            Err(ValidationError::NoValidItems(ContentKind::StudySet))
        );
    }

    #[test]
    fn test_optional_sections_absent() {
        let raw = json!({"summary": "s", "flashcards": [{"front": "f", "back": "b"}]});
        let set = validate_study_set(&raw, AnswerPolicy::Drop, 10).unwrap();
        assert!(set.title.is_none());
        assert!(set.script.is_none());
        assert!(set.quiz.is_empty());
    }
}
