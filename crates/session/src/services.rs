//! Wiring of the concrete HTTP clients behind the collaborator traits.

use skywatch_config::AppConfig;
use skywatch_core::{ForecastSource, Geocoder, Provider, Result};
use skywatch_providers::{DirectGeocoder, OpenAiCompatProvider, OpenMeteoClient};
use std::sync::Arc;
use tracing::{info, warn};

/// The three external collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub forecast: Arc<dyn ForecastSource>,
    pub geocoder: Arc<dyn Geocoder>,
    /// `None` when no chat API key is configured.
    pub chat: Option<Arc<dyn Provider>>,
}

impl Services {
    /// Validate `config` and build every client from it.
    ///
    /// A missing chat key disables chat instead of failing, so the
    /// dashboard still works without one.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let chat: Option<Arc<dyn Provider>> = if config.has_api_key() {
            Some(Arc::new(OpenAiCompatProvider::from_config(config)?))
        } else {
            warn!("No chat API key configured, chat disabled");
            None
        };

        info!(
            forecast = %config.forecast_base_url,
            chat_provider = %config.chat.provider,
            chat_enabled = chat.is_some(),
            "Services configured"
        );

        Ok(Self {
            forecast: Arc::new(OpenMeteoClient::from_config(config)?),
            geocoder: Arc::new(DirectGeocoder::from_config(config)?),
            chat,
        })
    }

    /// Load `~/.skywatch/config.toml` (plus environment overrides) and build.
    pub fn load() -> Result<(AppConfig, Self)> {
        let config = AppConfig::load()?;
        let services = Self::from_config(&config)?;
        Ok((config, services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_disabled_without_key() {
        let services = Services::from_config(&AppConfig::default()).unwrap();
        assert!(services.chat.is_none());
        assert_eq!(services.forecast.name(), "open-meteo");
        assert_eq!(services.geocoder.name(), "openweathermap");
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let mut config = AppConfig::default();
        config.chat.window_secs = 0;
        let err = Services::from_config(&config).err().unwrap();
        assert!(matches!(err, skywatch_core::Error::Config { .. }));
    }

    #[test]
    fn blank_key_keeps_chat_disabled() {
        let config = AppConfig {
            api_key: Some(String::new()),
            ..AppConfig::default()
        };
        assert!(Services::from_config(&config).unwrap().chat.is_none());
    }

    #[test]
    fn chat_enabled_with_key() {
        let config = AppConfig {
            api_key: Some("co-test".into()),
            ..AppConfig::default()
        };
        let services = Services::from_config(&config).unwrap();
        assert_eq!(services.chat.unwrap().name(), "cohere");
    }
}
