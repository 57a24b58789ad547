use crate::domain::model::Flashcard;

/// Inputs longer than this get a fourth card.
pub const FOURTH_CARD_THRESHOLD: usize = 500;
/// Inputs longer than this get a fifth card.
pub const FIFTH_CARD_THRESHOLD: usize = 1000;

const BASE_CARDS: [(&str, &str); 3] = [
    (
        "What is the main topic of the provided text?",
        "Based on the content you provided, this flashcard demonstrates the AI's ability to \
         analyze and create questions from your text.",
    ),
    (
        "How does AI flashcard generation work?",
        "AI analyzes the input text to identify key concepts, facts, and important information, \
         then formulates clear questions with comprehensive answers to aid in learning and \
         retention.",
    ),
    (
        "What are the benefits of using AI-generated flashcards?",
        "AI-generated flashcards save time, ensure consistent quality, identify key concepts \
         automatically, and can process large amounts of text quickly to create comprehensive \
         study materials.",
    ),
];

const FOURTH_CARD: (&str, &str) = (
    "What makes effective flashcard questions?",
    "Effective flashcard questions are clear, specific, focused on one concept, and promote \
     active recall rather than passive recognition.",
);

const FIFTH_CARD: (&str, &str) = (
    "How can flashcards improve learning outcomes?",
    "Flashcards improve learning through spaced repetition, active recall, and by breaking \
     complex information into digestible chunks that enhance memory retention.",
);

/// Offline cards used when no generator is configured.
///
/// Depends only on the character length of `text`.
pub fn fallback_flashcards(text: &str) -> Vec<Flashcard> {
    let length = text.chars().count();

    let mut entries: Vec<(&str, &str)> = BASE_CARDS.to_vec();
    if length > FOURTH_CARD_THRESHOLD {
        entries.push(FOURTH_CARD);
    }
    if length > FIFTH_CARD_THRESHOLD {
        entries.push(FIFTH_CARD);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (question, answer))| Flashcard::new(format!("mock-{}", i + 1), question, answer))
        .collect()
}
