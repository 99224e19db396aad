use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;
use url::Url;

use crate::providers::ProviderKind;
use crate::segmentation::model::SplitMode;
use crate::segmentation::quality::IssueThresholds;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Mode used when a request does not name one
    #[serde(default)]
    pub default_mode: SplitMode,

    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Provider credentials and endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Settings for one provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
    /// API key; empty means "read from `api_key_env`"
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Environment variable consulted when `api_key` is empty
    #[serde(default = "String::new")]
    pub api_key_env: String,

    /// Service endpoint URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    // @param provider: Provider kind
    // @returns: Settings with that provider's defaults
    pub fn new(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::OpenAI => Self {
                api_key: String::new(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            ProviderKind::Anthropic => Self {
                api_key: String::new(),
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            ProviderKind::Google => Self {
                api_key: String::new(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                endpoint: default_google_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    /// The configured key, falling back to the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// Settings for every supported provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai_settings")]
    pub openai: ProviderSettings,

    #[serde(default = "default_anthropic_settings")]
    pub anthropic: ProviderSettings,

    #[serde(default = "default_google_settings")]
    pub google: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai_settings(),
            anthropic: default_anthropic_settings(),
            google: default_google_settings(),
        }
    }
}

impl ProvidersConfig {
    /// Settings for a provider
    pub fn get(&self, provider: ProviderKind) -> &ProviderSettings {
        match provider {
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Google => &self.google,
        }
    }
}

/// Segmentation engine tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Deadline for a single model call, in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Maximum passages processed at once in batch mode
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Minimum regex confidence that avoids escalation in hybrid mode
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: f64,

    /// Korean issue detection thresholds
    #[serde(default)]
    pub thresholds: IssueThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            escalation_threshold: default_escalation_threshold(),
            thresholds: IssueThresholds::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_call_timeout_secs() -> u64 {
    90
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_escalation_threshold() -> f64 {
    0.9
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_google_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_openai_settings() -> ProviderSettings {
    ProviderSettings::new(ProviderKind::OpenAI)
}

fn default_anthropic_settings() -> ProviderSettings {
    ProviderSettings::new(ProviderKind::Anthropic)
}

fn default_google_settings() -> ProviderSettings {
    ProviderSettings::new(ProviderKind::Google)
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, writing the defaults first when the file is missing
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }
        Self::from_file(path)
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.display(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.default_model.trim().is_empty() {
            return Err(anyhow!("Default model must not be empty"));
        }
        if ProviderKind::for_model(&self.default_model).is_none() {
            return Err(anyhow!("No provider serves default model '{}'", self.default_model));
        }

        for provider in [ProviderKind::OpenAI, ProviderKind::Anthropic, ProviderKind::Google] {
            let settings = self.providers.get(provider);
            if !settings.endpoint.is_empty() {
                Url::parse(&settings.endpoint).map_err(|e| {
                    anyhow!(
                        "Invalid {} endpoint '{}': {}",
                        provider.display_name(),
                        settings.endpoint,
                        e
                    )
                })?;
            }
            if settings.timeout_secs == 0 {
                return Err(anyhow!("{} timeout must be positive", provider.display_name()));
            }
        }

        let engine = &self.engine;
        if engine.call_timeout_secs == 0 {
            return Err(anyhow!("Call timeout must be positive"));
        }
        if engine.max_concurrent_requests == 0 {
            return Err(anyhow!("Max concurrent requests must be at least 1"));
        }
        if !(0.0..=1.0).contains(&engine.escalation_threshold) {
            return Err(anyhow!(
                "Escalation threshold must be within [0, 1], got {}",
                engine.escalation_threshold
            ));
        }

        let thresholds = &engine.thresholds;
        if !(0.0..=1.0).contains(&thresholds.length_tolerance_ratio) {
            return Err(anyhow!(
                "Length tolerance ratio must be within [0, 1], got {}",
                thresholds.length_tolerance_ratio
            ));
        }
        if thresholds.incomplete_chars_per_word <= 0.0 {
            return Err(anyhow!("Incomplete chars per word must be positive"));
        }
        if thresholds.latin_run_min_len == 0 {
            return Err(anyhow!("Latin run minimum length must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_mode: SplitMode::default(),
            default_model: default_model(),
            log_level: LogLevel::default(),
            providers: ProvidersConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}
