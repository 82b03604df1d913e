//! Configuration loading, validation, and management for SkyWatch.
//!
//! Loads configuration from `~/.skywatch/config.toml` with environment
//! variable overrides. Validates all settings at startup. Components receive
//! their slice of [`AppConfig`] at construction and never read the process
//! environment themselves.

use serde::{Deserialize, Serialize};
use skywatch_core::LocationCandidate;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.skywatch/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Forecast provider base URL (Open-Meteo compatible)
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,

    /// Geocoding provider base URL (OpenWeatherMap direct geocoding compatible)
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,

    /// API key for the conversational service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API key for the geocoding provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocode_api_key: Option<String>,

    /// Chat model identifier
    #[serde(default = "default_chat_model_id")]
    pub chat_model_id: String,

    /// Location search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Conversational assistant settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Forecast windowing settings
    #[serde(default)]
    pub forecast: ForecastConfig,
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".into()
}
fn default_geocode_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".into()
}
fn default_chat_model_id() -> String {
    "command-r-plus-08-2024".into()
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
            .field("forecast_base_url", &self.forecast_base_url)
            .field("geocode_base_url", &self.geocode_base_url)
            .field("api_key", &redact(&self.api_key))
            .field("geocode_api_key", &redact(&self.geocode_api_key))
            .field("chat_model_id", &self.chat_model_id)
            .field("search", &self.search)
            .field("chat", &self.chat)
            .field("forecast", &self.forecast)
            .finish()
    }
}

/// What the search box shows when the geocoder fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Fallback candidates only; no error is reported.
    #[default]
    Silent,
    /// Fallback candidates plus a user-facing warning.
    Warn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Input inactivity before a query fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum candidates requested from the geocoder
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    #[serde(default)]
    pub fallback_mode: FallbackMode,
}

fn default_debounce_ms() -> u64 {
    800
}
fn default_result_limit() -> u32 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            result_limit: default_result_limit(),
            fallback_mode: FallbackMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Provider name used in logs
    #[serde(default = "default_chat_provider")]
    pub provider: String,

    /// OpenAI-compatible chat completions base URL
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Admitted requests per window
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Sliding window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Assistant display name used in the persona and greeting
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Override the persona preamble of the system turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,
}

fn default_chat_provider() -> String {
    "cohere".into()
}
fn default_chat_base_url() -> String {
    "https://api.cohere.com/compatibility/v1".into()
}
fn default_max_requests() -> usize {
    10
}
fn default_window_secs() -> u64 {
    60
}
fn default_temperature() -> f32 {
    0.7
}
fn default_assistant_name() -> String {
    "ClimaBot".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            base_url: default_chat_base_url(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            temperature: default_temperature(),
            max_tokens: None,
            assistant_name: default_assistant_name(),
            persona_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Samples per forward window
    #[serde(default = "default_window_hours")]
    pub window_hours: usize,

    /// Hourly briefs included in the grounding payload
    #[serde(default = "default_brief_hours")]
    pub brief_hours: usize,

    /// Location shown before the user picks one
    #[serde(default = "default_location")]
    pub default_location: LocationCandidate,
}

fn default_window_hours() -> usize {
    24
}
fn default_brief_hours() -> usize {
    12
}
fn default_location() -> LocationCandidate {
    LocationCandidate::new("Guayaquil", "EC", None, -2.1962, -79.8862)
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            brief_hours: default_brief_hours(),
            default_location: default_location(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.skywatch/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SKYWATCH_API_KEY` (highest priority), then `COHERE_API_KEY`
    /// - `SKYWATCH_GEOCODING_API_KEY`
    /// - `SKYWATCH_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("SKYWATCH_API_KEY")
                .ok()
                .or_else(|| std::env::var("COHERE_API_KEY").ok());
        }

        if config.geocode_api_key.is_none() {
            config.geocode_api_key = std::env::var("SKYWATCH_GEOCODING_API_KEY").ok();
        }

        if let Ok(model) = std::env::var("SKYWATCH_MODEL") {
            config.chat_model_id = model;
        }

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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skywatch")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.chat.max_requests == 0 || self.chat.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "chat.max_requests and chat.window_secs must be > 0".into(),
            ));
        }

        if self.forecast.window_hours == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.window_hours must be > 0".into(),
            ));
        }

        if self.forecast.brief_hours >= self.forecast.window_hours {
            return Err(ConfigError::ValidationError(
                "forecast.brief_hours must be smaller than forecast.window_hours".into(),
            ));
        }

        Ok(())
    }

    /// Check if a chat API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            geocode_base_url: default_geocode_base_url(),
            api_key: None,
            geocode_api_key: None,
            chat_model_id: default_chat_model_id(),
            search: SearchConfig::default(),
            chat: ChatConfig::default(),
            forecast: ForecastConfig::default(),
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

impl From<ConfigError> for skywatch_core::Error {
    fn from(err: ConfigError) -> Self {
        skywatch_core::Error::Config {
            message: err.to_string(),
        }
    }
}
