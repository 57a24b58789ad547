// Adapters layer: concrete implementations of the domain ports (http generator, storage).

pub mod gemini;
pub mod storage;

pub use gemini::GeminiGenerator;
pub use storage::LocalStorage;
