//! Configuration management for Briefwright.
//!
//! Handles loading and saving configuration from TOML files. API keys are
//! never stored here; providers read them from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interactive session settings
    pub session: SessionConfig,

    /// Generation pipeline settings
    pub orchestrator: OrchestratorConfig,

    /// Provider settings
    pub providers: ProvidersConfig,
}

/// Interactive session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rejections allowed per field before the answer is force-accepted
    pub max_retries: u32,

    /// Seconds of inactivity after which a session is purged
    pub idle_timeout_secs: u64,

    /// Wait for an explicit confirmation before generating
    pub confirm_before_generate: bool,
}

/// Generation pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Attempts per provider call (including the first)
    pub attempts: u32,

    /// Fixed pause between attempts, in milliseconds
    pub backoff_ms: u64,

    /// Time budget for a single provider call, in seconds
    pub call_timeout_secs: u64,

    /// Whether to generate the task breakdown
    pub task_breakdown: bool,

    /// Whether to generate `.cursorrules` content
    pub cursor_rules: bool,
}

/// Provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Azure OpenAI (fast/structured provider)
    pub azure: AzureConfig,

    /// Claude (deep/reasoning provider)
    pub claude: ClaudeConfig,
}

/// Azure OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Deployment name
    pub deployment: String,

    /// API version
    pub api_version: String,

    /// Completion token limit
    pub max_tokens: u32,
}

/// Claude configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig {
    /// Model to use
    pub model: String,

    /// Completion token limit
    pub max_tokens: u32,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.briefwright.toml` in current directory
    /// 2. `~/.config/briefwright/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".briefwright.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(global_config) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("briefwright"))
    }
}

impl SessionConfig {
    /// Idle duration after which a session expires.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl OrchestratorConfig {
    /// Retry policy for provider calls.
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.attempts.max(1),
            backoff: Duration::from_millis(self.backoff_ms),
            attempt_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_retries: 3, idle_timeout_secs: 30 * 60, confirm_before_generate: false }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff_ms: 500,
            call_timeout_secs: 60,
            task_breakdown: true,
            cursor_rules: false,
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: "gpt-4o-mini".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            max_tokens: 2000,
        }
    }
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self { model: "claude-3-haiku-20240307".to_string(), max_tokens: 4096 }
    }
}
