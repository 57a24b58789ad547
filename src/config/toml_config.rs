use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::core::export::ExportFormat;
use crate::core::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::core::ConfigProvider;
use crate::utils::error::{FlashcardError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const SUPPORTED_PROVIDERS: [&str; 1] = ["gemini"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub generator: GeneratorConfig,
    pub retry: Option<RetryConfig>,
    pub generation: Option<GenerationConfig>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub language: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FlashcardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FlashcardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FlashcardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("generator.endpoint", self.endpoint())?;
        crate::utils::validation::validate_non_empty_string("generator.model", self.model())?;
        crate::utils::validation::validate_path("output.output_path", &self.output.output_path)?;

        if let Some(provider) = &self.generator.provider {
            if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
                return Err(FlashcardError::InvalidConfigValueError {
                    field: "generator.provider".to_string(),
                    value: provider.clone(),
                    reason: format!(
                        "Unsupported provider. Valid providers: {}",
                        SUPPORTED_PROVIDERS.join(", ")
                    ),
                });
            }
        }

        if let Some(timeout) = self.generator.timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "generator.timeout_seconds",
                timeout,
                1,
            )?;
        }

        crate::utils::validation::validate_range(
            "retry.max_attempts",
            self.retry_policy().max_attempts,
            1,
            10,
        )?;

        if self.output.formats.is_empty() {
            return Err(FlashcardError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }

        for format in &self.output.formats {
            if ExportFormat::from_name(format).is_none() {
                return Err(FlashcardError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: "Unsupported format. Valid formats: json, csv, markdown".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 取得輸出格式（無法辨識的格式會在驗證階段被擋下）
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        self.output
            .formats
            .iter()
            .filter_map(|name| ExportFormat::from_name(name))
            .collect()
    }

    /// 取得預設主題覆蓋
    pub fn topic(&self) -> Option<&str> {
        self.generation.as_ref().and_then(|g| g.topic.as_deref())
    }

    pub fn provider(&self) -> &str {
        self.generator.provider.as_deref().unwrap_or("gemini")
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        self.generator.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn model(&self) -> &str {
        self.generator.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn api_key(&self) -> Option<&str> {
        // 未解析的 ${VAR} 視為沒有金鑰
        self.generator
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !(key.starts_with("${") && key.ends_with('}')))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.generator
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.as_ref();
        RetryPolicy::new(
            retry
                .and_then(|r| r.max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry
                .and_then(|r| r.base_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_BASE_DELAY),
        )
    }

    fn default_language(&self) -> Option<&str> {
        self.generation.as_ref().and_then(|g| g.language.as_deref())
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
