use crate::domain::model::Classification;
use regex::Regex;
use std::sync::OnceLock;

/// Inputs with at most this many whitespace-delimited tokens are topics.
pub const SHORT_TOPIC_MAX_TOKENS: usize = 20;

const INTERROGATIVE_PATTERN: &str = r"(?i)^(what|who|when|where|why|how|which)\b";

fn interrogative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(INTERROGATIVE_PATTERN).expect("interrogative pattern is a valid regex")
    })
}

/// Decide which prompt shape an input calls for. First matching rule wins.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();

    if trimmed.ends_with('?') || interrogative_regex().is_match(trimmed) {
        return Classification::Question;
    }

    if trimmed.split_whitespace().count() <= SHORT_TOPIC_MAX_TOKENS {
        Classification::ShortTopic
    } else {
        Classification::LongPassage
    }
}
