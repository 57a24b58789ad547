use crate::core::export::{render, ExportFormat};
use crate::core::pipeline::FlashcardPipeline;
use crate::core::{ContentGenerator, Flashcard, GenerationRequest, Storage};
use crate::utils::error::Result;

/// Result of one engine run: the batch and where each export landed.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub flashcards: Vec<Flashcard>,
    pub outputs: Vec<String>,
    pub offline: bool,
}

/// Generate a batch, then write it out in every requested format.
pub struct GenerationEngine<G: ContentGenerator, S: Storage> {
    pipeline: FlashcardPipeline<G>,
    storage: S,
    formats: Vec<ExportFormat>,
}

impl<G: ContentGenerator, S: Storage> GenerationEngine<G, S> {
    pub fn new(pipeline: FlashcardPipeline<G>, storage: S) -> Self {
        Self {
            pipeline,
            storage,
            formats: vec![ExportFormat::Json],
        }
    }

    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn pipeline(&self) -> &FlashcardPipeline<G> {
        &self.pipeline
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationReport> {
        tracing::info!("Starting flashcard generation...");

        // 生成
        let flashcards = self.pipeline.generate(request).await?;
        tracing::info!("Generated {} flashcards", flashcards.len());

        // 匯出：任何一種格式失敗就整批失敗
        let mut outputs = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let data = render(&flashcards, *format)?;
            tracing::debug!("Writing {} export ({} bytes)", format, data.len());
            let location = self.storage.write_file(&format.file_name(), &data).await?;
            tracing::info!("Saved {} export to: {}", format, location);
            outputs.push(location);
        }

        Ok(GenerationReport {
            flashcards,
            outputs,
            offline: self.pipeline.is_offline(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FlashcardError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("mock://{}", path))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("not an array".to_string())
        }
    }

    #[tokio::test]
    async fn test_offline_run_writes_every_format() {
        let storage = MockStorage::new();
        let engine = GenerationEngine::new(
            FlashcardPipeline::<FailingGenerator>::offline(),
            storage.clone(),
        )
        .with_formats(vec![ExportFormat::Json, ExportFormat::Csv, ExportFormat::Markdown]);

        let report = engine.run(&GenerationRequest::new("Rust")).await.unwrap();

        assert!(report.offline);
        assert_eq!(report.flashcards.len(), 3);
        assert_eq!(
            report.outputs,
            vec![
                "mock://flashcards.json",
                "mock://flashcards.csv",
                "mock://flashcards.md"
            ]
        );

        let csv = storage.get_file("flashcards.csv").await.unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("\"Question\",\"Answer\"\n"));
    }

    #[tokio::test]
    async fn test_failed_generation_writes_nothing() {
        let storage = MockStorage::new();
        let engine = GenerationEngine::new(FlashcardPipeline::new(FailingGenerator), storage.clone());

        let err = engine.run(&GenerationRequest::new("Rust")).await.unwrap_err();

        assert!(matches!(err, FlashcardError::GenerationFailed { .. }));
        assert!(storage.get_file("flashcards.json").await.is_none());
    }
}
