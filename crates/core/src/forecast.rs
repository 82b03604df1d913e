//! Forecast document types — the shape of one forecast provider response.
//!
//! `hourly` and `daily` are parallel-array sample series: one `time`
//! sequence plus value sequences indexed by the same position. Lengths are
//! not validated here; the window aligner tolerates ragged arrays.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProviderError;

/// One complete forecast response for a single location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub current: Option<CurrentReading>,
    #[serde(default)]
    pub hourly: HourlySeries,
    #[serde(default)]
    pub daily: DailySeries,
}

/// Scalar readings for the current instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReading {
    /// Local ISO-8601 instant, e.g. `2024-05-01T14:15`
    pub time: String,
    #[serde(rename = "temperature_2m", default = "missing_value", deserialize_with = "lossy_f64")]
    pub temperature: f64,
    #[serde(default = "missing_value", deserialize_with = "lossy_f64")]
    pub apparent_temperature: f64,
    #[serde(rename = "relative_humidity_2m", default = "missing_value", deserialize_with = "lossy_f64")]
    pub humidity: f64,
    #[serde(rename = "wind_speed_10m", default = "missing_value", deserialize_with = "lossy_f64")]
    pub wind_speed: f64,
    #[serde(default = "missing_code", deserialize_with = "lossy_code")]
    pub weather_code: i32,
    #[serde(default, deserialize_with = "lossy_flag")]
    pub is_day: u8,
}

/// Hourly sample series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m", default, deserialize_with = "lossy_f64s")]
    pub temperature: Vec<f64>,
    #[serde(default, deserialize_with = "lossy_f64s")]
    pub apparent_temperature: Vec<f64>,
    #[serde(rename = "relative_humidity_2m", default, deserialize_with = "lossy_f64s")]
    pub humidity: Vec<f64>,
    #[serde(rename = "wind_speed_10m", default, deserialize_with = "lossy_f64s")]
    pub wind_speed: Vec<f64>,
    #[serde(rename = "wind_gusts_10m", default, deserialize_with = "lossy_f64s")]
    pub wind_gusts: Vec<f64>,
    #[serde(default, deserialize_with = "lossy_codes")]
    pub weather_code: Vec<i32>,
}

/// Daily sample series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default, deserialize_with = "lossy_f64s")]
    pub uv_index_max: Vec<f64>,
    #[serde(default, deserialize_with = "lossy_f64s")]
    pub precipitation_probability_max: Vec<f64>,
    #[serde(rename = "wind_gusts_10m_max", default, deserialize_with = "lossy_f64s")]
    pub wind_gusts_max: Vec<f64>,
}

/// Today's peak values, the input to risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPeaks {
    pub uv_index_max: f64,
    pub precipitation_probability_max: f64,
    pub wind_gusts_max: f64,
}

impl DailySeries {
    /// Peaks for "today" — the first entry of each daily sequence.
    ///
    /// Returns `None` when any of the three sequences is empty.
    pub fn today_peaks(&self) -> Option<DailyPeaks> {
        Some(DailyPeaks {
            uv_index_max: *self.uv_index_max.first()?,
            precipitation_probability_max: *self.precipitation_probability_max.first()?,
            wind_gusts_max: *self.wind_gusts_max.first()?,
        })
    }
}

fn missing_value() -> f64 {
    f64::NAN
}

fn missing_code() -> i32 {
    -1
}

/// A null scalar reading becomes NaN instead of failing the whole document.
fn lossy_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn lossy_code<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(-1))
}

fn lossy_flag<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provider nulls become NaN so positions stay aligned.
fn lossy_f64s<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Deserialize::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Null weather codes become -1, which the code table renders as unknown.
fn lossy_codes<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<i32>> = Deserialize::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(-1)).collect())
}

/// A forecast provider keyed by latitude/longitude.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// A human-readable name for this source (e.g., "open-meteo").
    fn name(&self) -> &str;

    /// Fetch the full current/hourly/daily document for a coordinate pair.
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastDocument, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "latitude": -2.2,
        "longitude": -79.875,
        "timezone": "America/Guayaquil",
        "current": {
            "time": "2024-05-01T14:15",
            "interval": 900,
            "temperature_2m": 29.4,
            "relative_humidity_2m": 71,
            "apparent_temperature": 33.1,
            "is_day": 1,
            "weather_code": 2,
            "wind_speed_10m": 12.3
        },
        "hourly": {
            "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
            "temperature_2m": [24.1, null],
            "relative_humidity_2m": [88, 90],
            "apparent_temperature": [27.0, 26.5],
            "weather_code": [3, null],
            "wind_speed_10m": [4.0, 3.6],
            "wind_gusts_10m": [9.0, 8.2]
        },
        "daily": {
            "time": ["2024-05-01"],
            "uv_index_max": [7.5],
            "precipitation_probability_max": [35],
            "wind_gusts_10m_max": [28.4]
        }
    }"#;

    #[test]
    fn parses_open_meteo_document() {
        let doc: ForecastDocument = serde_json::from_str(SAMPLE).unwrap();
        let current = doc.current.as_ref().unwrap();
        assert_eq!(current.time, "2024-05-01T14:15");
        assert_eq!(current.weather_code, 2);
        assert!((current.humidity - 71.0).abs() < f64::EPSILON);
        assert_eq!(doc.hourly.time.len(), 2);
        assert_eq!(doc.hourly.wind_gusts, vec![9.0, 8.2]);
    }

    #[test]
    fn nulls_keep_positions() {
        let doc: ForecastDocument = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(doc.hourly.temperature.len(), 2);
        assert!(doc.hourly.temperature[1].is_nan());
        assert_eq!(doc.hourly.weather_code, vec![3, -1]);
    }

    #[test]
    fn today_peaks_from_first_entry() {
        let doc: ForecastDocument = serde_json::from_str(SAMPLE).unwrap();
        let peaks = doc.daily.today_peaks().unwrap();
        assert!((peaks.uv_index_max - 7.5).abs() < f64::EPSILON);
        assert!((peaks.precipitation_probability_max - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn null_current_reading_keeps_the_document() {
        let body = SAMPLE
            .replace(r#""temperature_2m": 29.4"#, r#""temperature_2m": null"#)
            .replace(r#""weather_code": 2,"#, r#""weather_code": null,"#)
            .replace(r#""is_day": 1,"#, r#""is_day": null,"#);
        let doc: ForecastDocument = serde_json::from_str(&body).unwrap();

        let current = doc.current.as_ref().unwrap();
        assert!(current.temperature.is_nan());
        assert_eq!(current.weather_code, -1);
        assert_eq!(current.is_day, 0);
        assert!((current.apparent_temperature - 33.1).abs() < f64::EPSILON);
        assert_eq!(doc.hourly.time.len(), 2);
        assert!(doc.daily.today_peaks().is_some());
    }

    #[test]
    fn absent_current_fields_read_as_missing() {
        let doc: ForecastDocument =
            serde_json::from_str(r#"{"current": {"time": "2024-05-01T14:15"}}"#).unwrap();
        let current = doc.current.unwrap();
        assert!(current.wind_speed.is_nan());
        assert_eq!(current.weather_code, -1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc: ForecastDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.current.is_none());
        assert!(doc.hourly.time.is_empty());
        assert!(doc.daily.today_peaks().is_none());
    }
}
