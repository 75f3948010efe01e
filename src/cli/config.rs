//! Configuration management for memoduet
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.memoduet/config.toml

use crate::budget::BudgetConfig;
use crate::completion::openai::{DEFAULT_BASE_URL, DEFAULT_ECONOMY_MODEL, DEFAULT_STANDARD_MODEL, DEFAULT_TIMEOUT};
use crate::completion::OpenAiClient;
use crate::dialogue::finalizer::{FinalizerConfig, DEFAULT_SUMMARY_MAX_TOKENS, DEFAULT_TITLE_MAX_TOKENS};
use crate::dialogue::scheduler::{SchedulerConfig, DEFAULT_MAX_ITERATIONS, STANDARD_TIER_TURNS};
use crate::dialogue::stop::STOP_MARKER;
use crate::errors::{DialogueError, Result};
use crate::execution::ExploreSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for memoduet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
    pub dialogue: DialogueConfig,
    pub logging: LoggingConfig,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub standard_model: String,
    pub economy_model: String,
    pub timeout_secs: u64,
}

/// Dialogue behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub max_iterations: usize,
    pub budget_cap_tokens: usize,
    pub minimum_reply_tokens: usize,
    pub warning_threshold: f64,
    pub standard_tier_turns: usize,
    pub stop_marker: String,
    pub summary_max_tokens: usize,
    pub title_max_tokens: usize,
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            standard_model: DEFAULT_STANDARD_MODEL.to_string(),
            economy_model: DEFAULT_ECONOMY_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        let budget = BudgetConfig::default();
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            budget_cap_tokens: budget.cap_tokens,
            minimum_reply_tokens: budget.minimum_reply_tokens,
            warning_threshold: budget.warning_threshold,
            standard_tier_turns: STANDARD_TIER_TURNS,
            stop_marker: STOP_MARKER.to_string(),
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            title_max_tokens: DEFAULT_TITLE_MAX_TOKENS,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DialogueError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| DialogueError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// `~/.memoduet/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".memoduet").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let dialogue = &self.dialogue;

        if dialogue.max_iterations == 0 {
            return Err(DialogueError::ConfigError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if dialogue.minimum_reply_tokens >= dialogue.budget_cap_tokens {
            return Err(DialogueError::ConfigError(
                "minimum_reply_tokens must be less than budget_cap_tokens".to_string(),
            ));
        }

        if !(dialogue.warning_threshold > 0.0 && dialogue.warning_threshold <= 1.0) {
            return Err(DialogueError::ConfigError(
                "warning_threshold must be in (0.0, 1.0]".to_string(),
            ));
        }

        if dialogue.stop_marker.trim().is_empty() {
            return Err(DialogueError::ConfigError(
                "stop_marker must not be empty".to_string(),
            ));
        }

        if self.completion.timeout_secs == 0 {
            return Err(DialogueError::ConfigError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| DialogueError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DialogueError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DialogueError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(mut self, max_iterations: Option<usize>, budget_cap_tokens: Option<usize>) -> Result<Self> {
        if let Some(max_iterations) = max_iterations {
            self.dialogue.max_iterations = max_iterations;
        }
        if let Some(cap) = budget_cap_tokens {
            self.dialogue.budget_cap_tokens = cap;
        }
        self.validate()?;
        Ok(self)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.completion.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DialogueError::ConfigError(format!(
                    "Environment variable {} is not set",
                    self.completion.api_key_env
                ))
            })
    }

    /// Build the completion client described by `[completion]`
    pub fn completion_client(&self) -> Result<OpenAiClient> {
        let completion = &self.completion;
        OpenAiClient::with_config(
            &completion.base_url,
            self.api_key()?,
            &completion.standard_model,
            &completion.economy_model,
            Duration::from_secs(completion.timeout_secs),
        )
    }

    /// Scheduler and finalizer settings described by `[dialogue]`
    pub fn explore_settings(&self) -> ExploreSettings {
        let dialogue = &self.dialogue;
        ExploreSettings {
            scheduler: SchedulerConfig {
                max_iterations: dialogue.max_iterations,
                standard_tier_turns: dialogue.standard_tier_turns,
                budget: BudgetConfig {
                    cap_tokens: dialogue.budget_cap_tokens,
                    minimum_reply_tokens: dialogue.minimum_reply_tokens,
                    warning_threshold: dialogue.warning_threshold,
                },
                stop_marker: dialogue.stop_marker.clone(),
            },
            finalizer: FinalizerConfig {
                summary_max_tokens: dialogue.summary_max_tokens,
                title_max_tokens: dialogue.title_max_tokens,
            },
        }
    }
}
