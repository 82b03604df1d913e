//! Display-ready rows derived from a window and today's peaks.

use serde::Serialize;
use skywatch_core::DailyPeaks;

use crate::aligner::HourlyWindow;
use crate::risk::{MetricStatus, RiskAssessment};
use crate::wmo::WeatherCondition;

/// Everything one alert row shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDetail {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
    pub reference_text: &'static str,
    pub status: MetricStatus,
}

/// One row of the risk monitor, tagged by metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertRow {
    Uv(AlertDetail),
    Rain(AlertDetail),
    Wind(AlertDetail),
}

impl AlertRow {
    pub fn detail(&self) -> &AlertDetail {
        match self {
            Self::Uv(d) | Self::Rain(d) | Self::Wind(d) => d,
        }
    }
}

/// Rendered in place of a missing provider value.
pub const NOT_AVAILABLE: &str = "N/A";

/// A reading as shown to users and to the assistant; NaN renders as `N/A`.
pub fn format_reading(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value}%")
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// UV, rain, and wind rows in display order.
pub fn alert_rows(peaks: &DailyPeaks) -> [AlertRow; 3] {
    let risk = RiskAssessment::from_peaks(peaks);
    [
        AlertRow::Uv(AlertDetail {
            icon: "☀️",
            label: "UV radiation",
            value: format_reading(peaks.uv_index_max),
            unit: "index",
            reference_text: "Normal: 0 - 2",
            status: risk.uv,
        }),
        AlertRow::Rain(AlertDetail {
            icon: "🌧️",
            label: "Chance of rain",
            value: format_percent(peaks.precipitation_probability_max),
            unit: "",
            reference_text: "Normal: < 30%",
            status: risk.rain,
        }),
        AlertRow::Wind(AlertDetail {
            icon: "💨",
            label: "Wind gusts",
            value: format_reading(peaks.wind_gusts_max),
            unit: "km/h",
            reference_text: "Normal: < 40 km/h",
            status: risk.gust,
        }),
    ]
}

/// One column of the hourly forecast table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub hour: String,
    pub icon: &'static str,
    pub temperature: i64,
    pub humidity: f64,
    pub wind_speed: f64,
}

pub fn table_rows(window: &HourlyWindow) -> Vec<TableRow> {
    window
        .points()
        .map(|p| TableRow {
            hour: p.time_label().to_string(),
            icon: WeatherCondition::from_wmo_code(p.weather_code).icon(),
            temperature: p.temperature.round() as i64,
            humidity: p.humidity,
            wind_speed: p.wind_speed,
        })
        .collect()
}

/// Daytime is 06:00 up to (not including) 18:00 local.
pub fn is_daytime(hour: u32) -> bool {
    (6..18).contains(&hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{hourly_window, ReferenceInstant, Granularity};
    use skywatch_core::HourlySeries;

    #[test]
    fn alert_rows_carry_status_per_metric() {
        let peaks = DailyPeaks {
            uv_index_max: 7.5,
            precipitation_probability_max: 35.0,
            wind_gusts_max: 45.0,
        };
        let rows = alert_rows(&peaks);

        assert!(matches!(rows[0], AlertRow::Uv(_)));
        assert_eq!(rows[0].detail().value, "7.5");
        assert_eq!(rows[0].detail().status, MetricStatus::High);

        assert!(matches!(rows[1], AlertRow::Rain(_)));
        assert_eq!(rows[1].detail().value, "35%");
        assert_eq!(rows[1].detail().status, MetricStatus::Low);

        assert!(matches!(rows[2], AlertRow::Wind(_)));
        assert_eq!(rows[2].detail().unit, "km/h");
        assert_eq!(rows[2].detail().status, MetricStatus::Medium);
    }

    #[test]
    fn missing_peaks_render_as_not_available() {
        let peaks = DailyPeaks {
            uv_index_max: f64::NAN,
            precipitation_probability_max: f64::NAN,
            wind_gusts_max: 12.0,
        };
        let rows = alert_rows(&peaks);
        assert_eq!(rows[0].detail().value, "N/A");
        assert_eq!(rows[1].detail().value, "N/A");
        assert_eq!(rows[2].detail().value, "12");
        assert_eq!(rows[0].detail().status, MetricStatus::Low);
    }

    #[test]
    fn format_reading_matches_for_finite_values() {
        assert_eq!(format_reading(29.4), "29.4");
        assert_eq!(format_reading(f64::INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn alert_row_serializes_with_kind_tag() {
        let peaks = DailyPeaks {
            uv_index_max: 1.0,
            precipitation_probability_max: 0.0,
            wind_gusts_max: 0.0,
        };
        let json = serde_json::to_value(&alert_rows(&peaks)[0]).unwrap();
        assert_eq!(json["kind"], "uv");
        assert_eq!(json["status"], "low");
    }

    #[test]
    fn table_rows_round_temperatures() {
        let series = HourlySeries {
            time: vec!["2024-05-01T13:00".into(), "2024-05-01T14:00".into()],
            temperature: vec![21.4, 21.6],
            apparent_temperature: vec![22.0, 22.0],
            humidity: vec![60.0, 58.0],
            wind_speed: vec![10.0, 12.0],
            wind_gusts: vec![20.0, 25.0],
            weather_code: vec![0, 61],
        };
        let reference = ReferenceInstant::from_timestamp("2024-05-01T13:20", Granularity::Hourly);
        let rows = table_rows(&hourly_window(&series, &reference, 24));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hour, "13:00");
        assert_eq!(rows[0].temperature, 21);
        assert_eq!(rows[1].temperature, 22);
        assert_eq!(rows[1].icon, "🌧️");
    }

    #[test]
    fn daytime_bounds() {
        assert!(!is_daytime(5));
        assert!(is_daytime(6));
        assert!(is_daytime(17));
        assert!(!is_daytime(18));
    }
}
