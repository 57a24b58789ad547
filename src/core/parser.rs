//! Turns raw model output into flashcards.
//!
//! The model is asked for a bare JSON array but often wraps it in prose or
//! code fences, so the first greedy `[` ... `]` span is taken as the payload.
//! Nested or multiple arrays in surrounding prose are not disambiguated.

use crate::domain::model::{BatchIds, Classification, Flashcard};
use crate::utils::error::{FlashcardError, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const JSON_ARRAY_PATTERN: &str = r"(?s)\[.*\]";

fn json_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(JSON_ARRAY_PATTERN).expect("array pattern is a valid regex"))
}

#[derive(Debug, Deserialize)]
struct RawCard {
    question: String,
    answer: String,
}

/// First greedy bracket-delimited span in `raw`, if any.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    json_array_regex().find(raw).map(|m| m.as_str())
}

/// Map a raw response to flashcards for the given classification.
///
/// `input` is the (truncated) user text; it becomes the question on the
/// [`Classification::Question`] path.
pub fn parse_response(
    classification: Classification,
    input: &str,
    raw: &str,
) -> Result<Vec<Flashcard>> {
    let ids = BatchIds::new(classification.id_prefix());

    match classification {
        Classification::Question => parse_answer(&ids, input, raw).map(|card| vec![card]),
        Classification::ShortTopic | Classification::LongPassage => parse_card_array(&ids, raw),
    }
}

fn parse_answer(ids: &BatchIds, input: &str, raw: &str) -> Result<Flashcard> {
    let question = input.trim();
    let answer = raw.trim();

    if question.is_empty() {
        return Err(FlashcardError::malformed("question text is empty"));
    }
    if answer.is_empty() {
        return Err(FlashcardError::malformed("model returned an empty answer"));
    }

    Ok(Flashcard::new(ids.single(), question, answer))
}

fn parse_card_array(ids: &BatchIds, raw: &str) -> Result<Vec<Flashcard>> {
    let payload = extract_json_array(raw)
        .ok_or_else(|| FlashcardError::malformed("no JSON array found in model response"))?;

    let raw_cards: Vec<RawCard> = serde_json::from_str(payload)
        .map_err(|e| FlashcardError::malformed(format!("invalid flashcard array: {}", e)))?;

    tracing::debug!("Decoded {} flashcard object(s)", raw_cards.len());

    raw_cards
        .into_iter()
        .enumerate()
        .map(|(index, card)| {
            let question = card.question.trim();
            let answer = card.answer.trim();
            if question.is_empty() || answer.is_empty() {
                return Err(FlashcardError::malformed(format!(
                    "flashcard {} has an empty question or answer",
                    index
                )));
            }
            Ok(Flashcard::new(ids.nth(index), question, answer))
        })
        .collect()
}
