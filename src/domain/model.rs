use serde::{Deserialize, Serialize};
use std::fmt;

/// A single question/answer study record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(id: impl Into<String>, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Input shape that decides which prompt template is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Question,
    ShortTopic,
    LongPassage,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::ShortTopic => "short_topic",
            Self::LongPassage => "long_passage",
        }
    }

    /// Prefix used for the ids of cards produced on this path.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Question => "qa",
            Self::ShortTopic => "topic",
            Self::LongPassage => "card",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-side bundle for one generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Batch-scoped id source: `{prefix}-{unix_millis}-{index}`.
#[derive(Debug, Clone)]
pub struct BatchIds {
    prefix: &'static str,
    stamp: i64,
}

impl BatchIds {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            stamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Id for a batch that only ever holds one card.
    pub fn single(&self) -> String {
        format!("{}-{}", self.prefix, self.stamp)
    }

    pub fn nth(&self, index: usize) -> String {
        format!("{}-{}-{}", self.prefix, self.stamp, index)
    }
}
