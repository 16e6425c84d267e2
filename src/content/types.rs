// content/types.rs - Requests and canonical generated items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What the caller wants generated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Quiz,
    Flashcards,
    StudySet,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Quiz => "quiz",
            ContentKind::Flashcards => "flashcards",
            ContentKind::StudySet => "studySet",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "quiz" => Ok(ContentKind::Quiz),
            "flashcards" | "flashcard" => Ok(ContentKind::Flashcards),
            "studyset" => Ok(ContentKind::StudySet),
            other => Err(format!("unknown content kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Inbound request, already authenticated and shape-checked by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content_kind: ContentKind,
    pub topic: String,
    #[serde(default)]
    pub item_count: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub source_text: Option<String>,
}

impl GenerationRequest {
    pub fn new(content_kind: ContentKind, topic: impl Into<String>) -> Self {
        Self {
            content_kind,
            topic: topic.into(),
            item_count: None,
            difficulty: None,
            source_text: None,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.item_count = Some(count);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }
}

/// Multiple-choice question with exactly four options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    pub options: [String; 4],
    /// Index into `options`, always in `0..=3`
    pub correct_answer: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    /// 1-based position within the generated set
    pub card_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudySet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizQuestion>,
}

/// A fully validated unit of generated content, ready for persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidatedItem {
    Quiz(QuizQuestion),
    Flashcard(Flashcard),
    StudySet(StudySet),
}

impl ValidatedItem {
    pub fn as_quiz(&self) -> Option<&QuizQuestion> {
        match self {
            ValidatedItem::Quiz(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_study_set(&self) -> Option<&StudySet> {
        match self {
            ValidatedItem::StudySet(set) => Some(set),
            _ => None,
        }
    }
}

/// Canonical, persistence-ready outcome of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub generation_id: Uuid,
    pub content_kind: ContentKind,
    pub topic: String,
    pub items: Vec<ValidatedItem>,
    pub provider_used: String,
    pub requested_count: u32,
    pub accepted_count: u32,
    pub generated_at: String,
}
