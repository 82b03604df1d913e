//! Direct geocoding: free-text city name → candidate locations.
//! Speaks the OpenWeatherMap `geo/1.0/direct` format.

use async_trait::async_trait;
use serde::Deserialize;
use skywatch_config::AppConfig;
use skywatch_core::{Geocoder, LocationCandidate, ProviderError};
use std::time::Duration;
use tracing::debug;

use crate::http;

#[derive(Debug, Deserialize)]
struct DirectGeocodeEntry {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<DirectGeocodeEntry> for LocationCandidate {
    fn from(entry: DirectGeocodeEntry) -> Self {
        LocationCandidate::new(entry.name, entry.country, entry.state, entry.lat, entry.lon)
    }
}

pub struct DirectGeocoder {
    base_url: String,
    api_key: Option<String>,
    limit: u32,
    client: reqwest::Client,
}

impl DirectGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        limit: u32,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            limit,
            client: http::build_client(Duration::from_secs(10))?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.geocode_base_url,
            config.geocode_api_key.clone(),
            config.search.result_limit,
        )
    }
}

#[async_trait]
impl Geocoder for DirectGeocoder {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn lookup(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("geocoding API key is not set".into()))?;

        let url = format!("{}/direct", self.base_url);
        debug!(query, limit = self.limit, "Sending geocoding request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("limit", self.limit.to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(self.name(), response).await?;
        let entries: Vec<DirectGeocodeEntry> = http::decode_json(response).await?;

        Ok(entries.into_iter().map(LocationCandidate::from).collect())
    }
}
