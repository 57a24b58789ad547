use crate::domain::model::Classification;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Generator returned HTTP {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("Generator response contained no text")]
    EmptyResponse,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed generator response: {message}")]
    MalformedResponse { message: String },

    #[error("Remote invocation failed after {attempts} attempt(s): {source}")]
    RemoteInvocationFailed {
        attempts: u32,
        #[source]
        source: Box<FlashcardError>,
    },

    #[error("Failed to generate flashcards ({classification}): {source}")]
    GenerationFailed {
        classification: Classification,
        #[source]
        source: Box<FlashcardError>,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Response,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlashcardError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FlashcardError::MalformedResponse {
            message: message.into(),
        }
    }

    /// 取得最內層的錯誤（穿過 GenerationFailed / RemoteInvocationFailed 包裝）
    pub fn root_cause(&self) -> &FlashcardError {
        match self {
            FlashcardError::GenerationFailed { source, .. }
            | FlashcardError::RemoteInvocationFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_malformed_response(&self) -> bool {
        match self {
            FlashcardError::MalformedResponse { .. } => true,
            FlashcardError::GenerationFailed { source, .. } => source.is_malformed_response(),
            _ => false,
        }
    }

    pub fn is_remote_failure(&self) -> bool {
        match self {
            FlashcardError::RemoteInvocationFailed { .. } => true,
            FlashcardError::GenerationFailed { source, .. } => source.is_remote_failure(),
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FlashcardError::ApiError(_)
            | FlashcardError::ApiStatusError { .. }
            | FlashcardError::EmptyResponse
            | FlashcardError::RemoteInvocationFailed { .. } => ErrorCategory::Network,
            FlashcardError::MalformedResponse { .. } | FlashcardError::SerializationError(_) => {
                ErrorCategory::Response
            }
            FlashcardError::GenerationFailed { source, .. } => source.category(),
            FlashcardError::ConfigError { .. }
            | FlashcardError::MissingConfigError { .. }
            | FlashcardError::InvalidConfigValueError { .. }
            | FlashcardError::ConfigValidationError { .. }
            | FlashcardError::ValidationError { .. } => ErrorCategory::Configuration,
            FlashcardError::CsvError(_) | FlashcardError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Response => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your API key and network connection, then try again"
            }
            ErrorCategory::Response => {
                "The model returned an unexpected format; try again or shorten the input"
            }
            ErrorCategory::Configuration => "Review the configuration values and command-line flags",
            ErrorCategory::Output => "Make sure the output path exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root_cause() {
            FlashcardError::MalformedResponse { .. } => {
                "Generation failed: the model response could not be turned into flashcards."
                    .to_string()
            }
            FlashcardError::ApiError(_)
            | FlashcardError::ApiStatusError { .. }
            | FlashcardError::EmptyResponse => {
                "Generation failed: the language model could not be reached.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failed_exposes_inner_kind() {
        let err = FlashcardError::GenerationFailed {
            classification: Classification::ShortTopic,
            source: Box::new(FlashcardError::malformed("no array")),
        };

        assert!(err.is_malformed_response());
        assert!(!err.is_remote_failure());
        assert_eq!(err.category(), ErrorCategory::Response);
        assert!(matches!(
            err.root_cause(),
            FlashcardError::MalformedResponse { .. }
        ));
    }

    #[test]
    fn test_remote_failure_keeps_last_cause() {
        let err = FlashcardError::RemoteInvocationFailed {
            attempts: 3,
            source: Box::new(FlashcardError::ApiStatusError {
                status: 503,
                body: "overloaded".to_string(),
            }),
        };

        assert!(err.is_remote_failure());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.to_string().contains("503"));
        assert!(matches!(
            err.root_cause(),
            FlashcardError::ApiStatusError { status: 503, .. }
        ));
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = FlashcardError::MissingConfigError {
            field: "generator.model".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
