use crate::domain::model::Flashcard;
use crate::utils::error::{FlashcardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DOCUMENT_TITLE: &str = "FlashAI - Generated Flashcards";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }

    pub fn file_name(&self) -> String {
        format!("flashcards.{}", self.extension())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

pub fn render(cards: &[Flashcard], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => to_json(cards),
        ExportFormat::Csv => to_csv(cards),
        ExportFormat::Markdown => Ok(to_document(cards).into_bytes()),
    }
}

/// The batch verbatim, as a pretty-printed JSON array.
pub fn to_json(cards: &[Flashcard]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(cards)?)
}

/// `Question,Answer` header plus one row per card; every field quoted.
pub fn to_csv(cards: &[Flashcard]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Question", "Answer"])?;
    for card in cards {
        writer.write_record([card.question.as_str(), card.answer.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| FlashcardError::IoError(e.into_error()))
}

/// Title block followed by one page-ruled block per card.
pub fn to_document(cards: &[Flashcard]) -> String {
    let mut doc = format!("# {}\n\n{} card(s)\n", DOCUMENT_TITLE, cards.len());

    for (index, card) in cards.iter().enumerate() {
        doc.push_str("\n---\n\n");
        doc.push_str(&format!("## Card {}\n\n", index + 1));
        doc.push_str(&format!("**Q:** {}\n\n", card.question));
        doc.push_str(&format!("**A:** {}\n", card.answer));
    }

    doc
}
