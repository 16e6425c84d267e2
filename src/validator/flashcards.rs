// validator/flashcards.rs - Flashcard rules

use super::text_field;
use crate::content::Flashcard;
use serde_json::Value;

const FRONT_KEYS: [&str; 3] = ["front", "term", "question"];
const BACK_KEYS: [&str; 3] = ["back", "definition", "answer"];

pub(crate) fn validate_cards(items: &[Value]) -> Vec<Flashcard> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let front = text_field(item, &FRONT_KEYS);
            let back = text_field(item, &BACK_KEYS);
            match (front, back) {
                (Some(front), Some(back)) => Some(Flashcard {
                    front,
                    back,
                    card_number: 0,
                }),
                _ => {
                    tracing::debug!(index, "Dropping flashcard with blank front or back");
                    None
                }
            }
        })
        .collect()
}

/// Number cards `1..=n` in their current order
pub(crate) fn renumber(cards: &mut [Flashcard]) {
    for (card, number) in cards.iter_mut().zip(1u32..) {
        card.card_number = number;
    }
}
