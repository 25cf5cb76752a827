//! kograph Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults. The environment is only consulted here; extractors
//! receive explicit values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Artifact output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(&lookup)?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.llm.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_lookup(&|key: &str| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_lookup<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // LLM
        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(key) = get(self.llm.provider.api_key_env()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(temperature) = get("LLM_TEMPERATURE") {
            self.llm.temperature = parse_temperature("LLM_TEMPERATURE", &temperature)?;
        }

        // Output
        if let Some(dir) = get("KOGRAPH_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        // Logging
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}

/// Parse a generation temperature, which must lie in [0.0, 1.0]
pub fn parse_temperature(key: &str, value: &str) -> Result<f32, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    let temperature: f32 = value.trim().parse().map_err(|_| invalid())?;
    if (0.0..=1.0).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(invalid())
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// API key; absence forces the rule-based strategy
    pub api_key: Option<String>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Model name, passed through to the provider
    pub model: String,

    /// Generation randomness in [0.0, 1.0]
    pub temperature: f32,

    /// Maximum tokens for completion
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Whether a usable credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if (0.0..=1.0).contains(&self.temperature) {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                key: "llm.temperature".to_string(),
                value: self.temperature.to_string(),
            })
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            base_url: None,
            model: "models/gemini-2.0-pro-exp-02-05".to_string(),
            temperature: 0.2,
            max_tokens: 8192,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAI,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Artifact output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory artifacts are written to
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./output"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
