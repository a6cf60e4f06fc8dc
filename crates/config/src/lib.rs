//! Configuration loading, validation, and management for Switchyard.
//!
//! Loads configuration from `~/.switchyard/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use switchyard_core::RouteLabel;

/// The root configuration structure.
///
/// Maps directly to `~/.switchyard/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Name reported in logs and events
    #[serde(default = "default_graph_name")]
    pub graph_name: String,

    /// Oracle used for intent classification
    #[serde(default)]
    pub classifier: OracleConfig,

    /// Oracle used for the catch-all conversational reply
    #[serde(default)]
    pub general_input: OracleConfig,

    /// Built-in specialist handlers, keyed by route name
    #[serde(default)]
    pub specialists: HashMap<String, SpecialistConfig>,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Vendor keys picked up from the environment, keyed by provider name
    #[serde(skip)]
    env_keys: HashMap<String, String>,
}

/// Environment variables that hold a key for one vendor only.
const VENDOR_KEY_VARS: [(&str, &str); 3] = [
    ("openai", "OPENAI_API_KEY"),
    ("openrouter", "OPENROUTER_API_KEY"),
    ("anthropic", "ANTHROPIC_API_KEY"),
];

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_graph_name() -> String {
    "Generative UI Agent".into()
}
fn default_specialist_temperature() -> f32 {
    0.0
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("graph_name", &self.graph_name)
            .field("classifier", &self.classifier)
            .field("general_input", &self.general_input)
            .field("specialists", &self.specialists)
            .field("providers", &self.providers)
            .field("env_keys", &self.env_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Which provider and model a router component talks to.
///
/// Unset fields fall back to `default_provider` / `default_model`.
/// Classification and the fallback reply always run at temperature 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Settings for an LLM-backed specialist handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_specialist_temperature")]
    pub temperature: f32,

    /// Replaces the built-in persona prompt for this route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for SpecialistConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            temperature: default_specialist_temperature(),
            system_prompt: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// A fully resolved provider/model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleTarget {
    pub provider: String,
    pub model: String,
}

impl AppConfig {
    /// Load configuration from the default path (~/.switchyard/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `SWITCHYARD_API_KEY`: generic key for any provider without its own
    /// - `OPENAI_API_KEY`, `OPENROUTER_API_KEY`, `ANTHROPIC_API_KEY`: used
    ///   only by the matching provider
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("SWITCHYARD_API_KEY");
        }

        for (provider, key_var) in VENDOR_KEY_VARS {
            if let Some(key) = var(key_var) {
                self.env_keys.insert(provider.into(), key);
            }
        }

        if let Some(provider) = var("SWITCHYARD_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = var("SWITCHYARD_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".switchyard")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, specialist) in &self.specialists {
            let route: RouteLabel = name.parse().map_err(|_| {
                ConfigError::ValidationError(format!("unknown specialist route '{name}'"))
            })?;
            if route.is_catch_all() {
                return Err(ConfigError::ValidationError(format!(
                    "'{name}' is the catch-all route; configure it under [general_input]"
                )));
            }
            if !(0.0..=2.0).contains(&specialist.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "specialists.{name}.temperature must be between 0.0 and 2.0"
                )));
            }
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the classifier's provider and model.
    pub fn classifier_target(&self) -> OracleTarget {
        self.resolve(self.classifier.provider.as_deref(), self.classifier.model.as_deref())
    }

    /// Resolve the fallback handler's provider and model.
    pub fn general_input_target(&self) -> OracleTarget {
        self.resolve(
            self.general_input.provider.as_deref(),
            self.general_input.model.as_deref(),
        )
    }

    /// Settings for a specialized route (defaults when not configured).
    pub fn specialist(&self, route: RouteLabel) -> SpecialistConfig {
        self.specialists
            .get(route.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve a specialist route's provider and model.
    pub fn specialist_target(&self, route: RouteLabel) -> OracleTarget {
        let specialist = self.specialist(route);
        self.resolve(specialist.provider.as_deref(), specialist.model.as_deref())
    }

    fn resolve(&self, provider: Option<&str>, model: Option<&str>) -> OracleTarget {
        let provider = provider.unwrap_or(&self.default_provider).to_string();
        let model = model
            .map(String::from)
            .or_else(|| {
                self.providers
                    .get(&provider)
                    .and_then(|p| p.default_model.clone())
            })
            .unwrap_or_else(|| self.default_model.clone());
        OracleTarget { provider, model }
    }

    /// The key to send to `provider`.
    ///
    /// `[providers.<name>].api_key` first, then that vendor's own env var,
    /// then the generic `api_key`. A vendor env var never reaches another
    /// provider.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.env_keys.get(provider).cloned())
            .or_else(|| self.api_key.clone())
    }

    /// Check if the default provider has an API key (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.default_provider).is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            graph_name: default_graph_name(),
            classifier: OracleConfig::default(),
            general_input: OracleConfig::default(),
            specialists: HashMap::new(),
            providers: HashMap::new(),
            env_keys: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
