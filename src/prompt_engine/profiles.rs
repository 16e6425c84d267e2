// prompt_engine/profiles.rs - Per-kind output contracts and difficulty guidance

use crate::content::{ContentKind, Difficulty};

/// Template pieces for one content kind
pub struct Profile {
    pub goal: String,
    pub return_format: String,
    pub warnings: Vec<&'static str>,
}

const QUIZ_ITEM_SHAPE: &str = r#"{"question": "string", "options": ["string", "string", "string", "string"], "correctAnswer": 0, "explanation": "string"}"#;
const FLASHCARD_ITEM_SHAPE: &str = r#"{"front": "string", "back": "string"}"#;

const COMMON_WARNINGS: [&str; 3] = [
    "Return ONLY the JSON object. No markdown, no code fences, no text before or after it.",
    "Use double quotes for every key and string value; no trailing commas, no comments.",
    "Every string field must be non-empty.",
];

const QUIZ_WARNINGS: [&str; 3] = [
    "Each question has EXACTLY 4 options, all distinct.",
    "\"correctAnswer\" is the 0-based index (0, 1, 2 or 3) of the correct option, as a number.",
    "Exactly one option is correct; the others are plausible but wrong.",
];

const FLASHCARD_WARNINGS: [&str; 1] = [
    "\"front\" holds a term or question; \"back\" holds a concise answer or definition.",
];

pub fn profile(kind: ContentKind, topic: &str, count: u32) -> Profile {
    let mut warnings: Vec<&'static str> = COMMON_WARNINGS.to_vec();

    match kind {
        ContentKind::Quiz => {
            warnings.extend(QUIZ_WARNINGS);
            Profile {
                goal: format!(
                    "Write {} multiple-choice quiz questions about \"{}\".",
                    count, topic
                ),
                return_format: format!(
                    "{{\"questions\": [{}]}}\nThe \"questions\" array holds exactly {} items.",
                    QUIZ_ITEM_SHAPE, count
                ),
                warnings,
            }
        }
        ContentKind::Flashcards => {
            warnings.extend(FLASHCARD_WARNINGS);
            Profile {
                goal: format!("Write {} study flashcards about \"{}\".", count, topic),
                return_format: format!(
                    "{{\"flashcards\": [{}]}}\nThe \"flashcards\" array holds exactly {} items.",
                    FLASHCARD_ITEM_SHAPE, count
                ),
                warnings,
            }
        }
        ContentKind::StudySet => {
            warnings.extend(QUIZ_WARNINGS);
            warnings.extend(FLASHCARD_WARNINGS);
            Profile {
                goal: format!(
                    "Build a complete study set about \"{}\": a summary, a short narrated \
                     lesson script, {} flashcards and {} quiz questions.",
                    topic, count, count
                ),
                return_format: format!(
                    "{{\"title\": \"string\", \"summary\": \"string\", \"script\": \"string\", \
                     \"flashcards\": [{}], \"quiz\": [{}]}}\n\
                     \"flashcards\" and \"quiz\" each hold exactly {} items.",
                    FLASHCARD_ITEM_SHAPE, QUIZ_ITEM_SHAPE, count
                ),
                warnings,
            }
        }
    }
}

pub fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Target beginners: test core definitions and well-known facts, use plain language, \
             and avoid trick wording."
        }
        Difficulty::Medium => {
            "Target learners with some background: mix recall with application, and make \
             distractors plausible."
        }
        Difficulty::Hard => {
            "Target advanced learners: require multi-step reasoning, edge cases and comparisons \
             between related concepts; distractors should reflect common misconceptions."
        }
    }
}
