// prompt_engine/mod.rs - Provider-agnostic prompt construction

pub mod clarity;
mod profiles;

use crate::config::DEFAULT_SOURCE_TEXT_MAX_CHARS;
use crate::content::{ContentKind, Difficulty};

/// System instruction sent alongside every prompt
pub const SYSTEM_INSTRUCTION: &str = "You are an educational content generator. \
    You reply with a single valid JSON object that matches the requested format exactly, \
    and nothing else.";

/// Builds the instruction text for a generation. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_text_max_chars: usize,
}

impl PromptBuilder {
    pub fn new(source_text_max_chars: usize) -> Self {
        Self {
            source_text_max_chars,
        }
    }

    pub fn build(
        &self,
        kind: ContentKind,
        topic: &str,
        count: u32,
        difficulty: Option<Difficulty>,
        source_text: Option<&str>,
    ) -> String {
        let profile = profiles::profile(kind, topic, count);

        let mut context = format!("Topic: {}", topic);
        if let Some(difficulty) = difficulty {
            context.push_str(&format!(
                "\nDifficulty: {}\n{}",
                difficulty,
                profiles::difficulty_guidance(difficulty)
            ));
        }
        if let Some(source) = source_text.map(str::trim).filter(|s| !s.is_empty()) {
            context.push_str(&format!(
                "\nBase the content on this reference material and stay consistent with it:\n\"\"\"\n{}\n\"\"\"",
                clarity::truncate_chars(source, self.source_text_max_chars)
            ));
        }

        format!(
            "# GOAL\n{}\n\n# RETURN FORMAT\n{}\n\n# WARNINGS\n{}\n\n# CONTEXT\n{}",
            profile.goal,
            profile.return_format,
            profile
                .warnings
                .iter()
                .map(|w| format!("- {}", w))
                .collect::<Vec<_>>()
                .join("\n"),
            context
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_TEXT_MAX_CHARS)
    }
}
