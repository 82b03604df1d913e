//! Open-Meteo forecast client.
//!
//! One GET per location returns `current`, `hourly`, and `daily` sections in
//! the location's own timezone (`timezone=auto`), so hourly timestamps are
//! directly comparable with local wall-clock time.

use async_trait::async_trait;
use skywatch_config::AppConfig;
use skywatch_core::{ForecastDocument, ForecastSource, ProviderError};
use std::time::Duration;
use tracing::debug;

use crate::http;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_gusts_10m";
const DAILY_FIELDS: &str = "uv_index_max,precipitation_probability_max,wind_gusts_10m_max";

pub struct OpenMeteoClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http::build_client(Duration::from_secs(15))?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(&config.forecast_base_url)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastDocument, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(latitude, longitude, "Fetching forecast");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(self.name(), response).await?;
        http::decode_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = OpenMeteoClient::new("https://api.open-meteo.com/v1/").unwrap();
        assert_eq!(client.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn requests_fields_the_dashboard_needs() {
        assert!(HOURLY_FIELDS.contains("wind_gusts_10m"));
        assert!(DAILY_FIELDS.contains("uv_index_max"));
        assert!(CURRENT_FIELDS.contains("weather_code"));
    }
}
