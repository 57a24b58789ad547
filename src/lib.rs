pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{GeminiGenerator, LocalStorage};
pub use core::{
    engine::{GenerationEngine, GenerationReport},
    export::ExportFormat,
    pipeline::{FlashcardPipeline, GenerationPlan},
    retry::RetryPolicy,
};
pub use domain::model::{Classification, Flashcard, GenerationRequest};
pub use domain::ports::{ConfigProvider, ContentGenerator, Storage};
pub use utils::error::{FlashcardError, Result};
