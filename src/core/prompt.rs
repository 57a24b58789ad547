use crate::domain::model::Classification;

/// Inputs longer than this are cut before a prompt is built.
pub const MAX_INPUT_CHARS: usize = 15_000;

pub const DEFAULT_LANGUAGE: &str = "English";

/// Number of cards requested for a long passage.
pub const PASSAGE_CARD_RANGE: (usize, usize) = (15, 20);

/// Cut `text` to at most [`MAX_INPUT_CHARS`] characters, on a char boundary.
pub fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Blank or missing languages fall back to [`DEFAULT_LANGUAGE`].
pub fn resolve_language(language: Option<&str>) -> &str {
    match language.map(str::trim) {
        Some(lang) if !lang.is_empty() => lang,
        _ => DEFAULT_LANGUAGE,
    }
}

pub fn build_prompt(classification: Classification, text: &str, language: &str) -> String {
    let text = truncate_input(text).trim();

    match classification {
        Classification::Question => question_prompt(text, language),
        Classification::ShortTopic => topic_prompt(text, language),
        Classification::LongPassage => passage_prompt(text, language),
    }
}

fn question_prompt(question: &str, language: &str) -> String {
    format!(
        "You are a helpful AI tutor. The user asked the following question:\n\
         \"{question}\"\n\n\
         Answer in {language}, concisely but completely.\n\
         Return plain text only: no JSON, no markdown, no extra formatting.\n"
    )
}

fn topic_prompt(topic: &str, language: &str) -> String {
    format!(
        "You are an expert AI tutor. Generate as many question-answer pairs as the topic \
         below deserves; there is no upper limit.\n\
         Answer in {language}.\n\
         {format}\n\
         {section}",
        format = json_array_instructions(
            "Question about the topic",
            &format!("Comprehensive answer in {language}"),
        ),
        section = section("Topic", topic),
    )
}

fn passage_prompt(passage: &str, language: &str) -> String {
    let (min, max) = PASSAGE_CARD_RANGE;
    format!(
        "Based on the following text, create {min}-{max} flashcards with clear questions \
         and comprehensive answers covering its key content.\n\
         Answer in {language}.\n\
         {format}\n\
         {section}",
        format = json_array_instructions(
            "Clear, specific question about the content",
            "Comprehensive answer that fully explains the concept",
        ),
        section = section("Text to analyze", passage),
    )
}

fn json_array_instructions(question_hint: &str, answer_hint: &str) -> String {
    format!(
        "Format the output strictly as a JSON array:\n\
         [\n  {{\n    \"question\": \"{}\",\n    \"answer\": \"{}\"\n  }}\n]",
        question_hint, answer_hint
    )
}

/// Wrap text in a labeled section.
fn section(label: &str, content: &str) -> String {
    format!("{}:\n{}\n", label, content)
}
