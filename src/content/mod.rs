// content/mod.rs - Domain types shared by every pipeline stage

mod types;

pub use types::{
    ContentKind, Difficulty, Flashcard, GenerationRequest, GenerationResult, QuizQuestion,
    StudySet, ValidatedItem,
};
