use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::core::export::ExportFormat;
use crate::core::prompt::DEFAULT_LANGUAGE;
use crate::core::retry::RetryPolicy;
use crate::core::{ConfigProvider, GenerationRequest};
use crate::utils::error::{FlashcardError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "flashai")]
#[command(about = "Generate study flashcards from a question, a topic, or a passage")]
pub struct CliConfig {
    /// Text to turn into flashcards
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long)]
    pub input_file: Option<String>,

    /// Generate cards about this topic, skipping input classification
    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Gemini API key; without one, offline sample cards are produced
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value = "3")]
    pub max_attempts: u32,

    #[arg(long, default_value = "1000")]
    pub retry_base_delay_ms: u64,

    #[arg(long, default_value = "60")]
    pub timeout_seconds: u64,

    /// Export formats (repeatable)
    #[arg(long = "format", value_enum, default_values_t = vec![ExportFormat::Json])]
    pub formats: Vec<ExportFormat>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Also print the generated cards to stdout
    #[arg(long)]
    pub print: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 組合請求內容；檔案輸入優先於命令列文字
    pub async fn load_request(&self) -> Result<GenerationRequest> {
        let text = match &self.input_file {
            Some(path) => tokio::fs::read_to_string(path).await?,
            None => self.text.clone().unwrap_or_default(),
        };

        let has_topic = self.topic.as_deref().is_some_and(|t| !t.trim().is_empty());
        if text.trim().is_empty() && !has_topic {
            return Err(FlashcardError::ValidationError {
                message: "No content provided: pass text, --input-file, or --topic"
                    .to_string(),
            });
        }

        let mut request = GenerationRequest::new(text).with_language(self.language.clone());
        if let Some(topic) = &self.topic {
            request = request.with_topic(topic.clone());
        }
        Ok(request)
    }
}

impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    fn default_language(&self) -> Option<&str> {
        Some(&self.language)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_non_empty_string("model", &self.model)?;
        validate_range("max_attempts", self.max_attempts, 1, 10)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validate_path("output_path", &self.output_path)?;
        if self.formats.is_empty() {
            return Err(FlashcardError::MissingConfigError {
                field: "format".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["flashai", "Photosynthesis"]);

        assert_eq!(config.text.as_deref(), Some("Photosynthesis"));
        assert_eq!(config.language, "English");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.formats, vec![ExportFormat::Json]);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_repeated_formats_and_overrides() {
        let config = CliConfig::parse_from([
            "flashai",
            "--format",
            "csv",
            "--format",
            "markdown",
            "--max-attempts",
            "5",
            "--api-key",
            "  ",
            "Rust",
        ]);

        assert_eq!(config.formats, vec![ExportFormat::Csv, ExportFormat::Markdown]);
        assert_eq!(config.retry_policy().max_attempts, 5);
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_zero_attempts_fails_validation() {
        let config = CliConfig::parse_from(["flashai", "--max-attempts", "0", "Rust"]);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let config = CliConfig::parse_from(["flashai", "   "]);
        let err = config.load_request().await.unwrap_err();
        assert!(matches!(err, FlashcardError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_topic_alone_is_enough() {
        let config = CliConfig::parse_from(["flashai", "--topic", "Rayleigh scattering"]);
        let request = config.load_request().await.unwrap();
        assert_eq!(request.topic.as_deref(), Some("Rayleigh scattering"));
        assert_eq!(request.text, "");
    }
}
