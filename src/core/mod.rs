pub mod classifier;
pub mod engine;
pub mod export;
pub mod fallback;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod retry;

pub use crate::domain::model::{Classification, Flashcard, GenerationRequest};
pub use crate::domain::ports::{ConfigProvider, ContentGenerator, Storage};
pub use crate::utils::error::Result;
