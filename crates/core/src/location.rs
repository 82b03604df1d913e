//! Location candidates and the geocoding contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A place a user can pick from search results.
///
/// Candidates from the geocoder and from the static fallback table are the
/// same type; consumers cannot tell them apart except through the
/// `degraded` flag of the search outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCandidate {
    /// Build a candidate, rounding coordinates to 4 decimal places.
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        region: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            region,
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        }
    }

    /// "Name, Region, Country" with empty parts skipped.
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(region) = self.region.as_deref().filter(|r| !r.is_empty() && *r != self.name) {
            parts.push(region);
        }
        if !self.country.is_empty() {
            parts.push(&self.country);
        }
        parts.join(", ")
    }
}

/// Round a coordinate to 4 decimal places (~11 m).
pub fn round_coordinate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// The fixed candidate set substituted when the geocoder fails.
pub fn fallback_candidates() -> Vec<LocationCandidate> {
    vec![
        LocationCandidate::new("Madrid (offline)", "ES", Some("Madrid".into()), 40.4168, -3.7038),
        LocationCandidate::new("Buenos Aires (offline)", "AR", None, -34.6037, -58.3816),
        LocationCandidate::new("New York (offline)", "US", Some("NY".into()), 40.7128, -74.0060),
    ]
}

/// A free-text location search provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// A human-readable name for this geocoder (e.g., "openweathermap").
    fn name(&self) -> &str;

    /// Resolve a city name to candidate locations.
    async fn lookup(&self, query: &str) -> Result<Vec<LocationCandidate>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_rounded() {
        let c = LocationCandidate::new("Quito", "EC", None, -0.180653123, -78.467834999);
        assert_eq!(c.latitude, -0.1807);
        assert_eq!(c.longitude, -78.4678);
    }

    #[test]
    fn display_name_skips_missing_region() {
        let c = LocationCandidate::new("Guayaquil", "EC", None, -2.1962, -79.8862);
        assert_eq!(c.display_name(), "Guayaquil, EC");

        let c = LocationCandidate::new("Austin", "US", Some("Texas".into()), 30.2672, -97.7431);
        assert_eq!(c.display_name(), "Austin, Texas, US");
    }

    #[test]
    fn fallback_set_is_labelled() {
        let set = fallback_candidates();
        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|c| c.name.contains("(offline)")));
    }
}
