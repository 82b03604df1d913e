//! Time window alignment over parallel-array sample series.
//!
//! A series is one ascending `time` sequence plus value sequences sharing its
//! indices. Alignment finds the first timestamp whose prefix equals the
//! reference instant (e.g. `2024-05-01T14` for hourly data) and cuts a
//! forward window from there.
//!
//! Alignment never fails:
//! - no prefix match (stale data, clock skew) falls back to index 0
//! - a tail shorter than the window is clipped, never wrapped or padded
//! - an empty series yields an empty window

use chrono::NaiveDateTime;
use serde::Serialize;
use skywatch_core::HourlySeries;

/// Samples per forward window unless configured otherwise.
pub const DEFAULT_WINDOW_SIZE: usize = 24;

/// Sampling granularity of a series, which fixes the reference prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    fn format(self) -> &'static str {
        match self {
            Self::Hourly => "%Y-%m-%dT%H",
            Self::Daily => "%Y-%m-%d",
        }
    }

    fn prefix_len(self) -> usize {
        match self {
            Self::Hourly => 13,
            Self::Daily => 10,
        }
    }
}

/// "Now" truncated to a series' granularity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceInstant {
    prefix: String,
}

impl ReferenceInstant {
    pub fn from_datetime(now: NaiveDateTime, granularity: Granularity) -> Self {
        Self {
            prefix: now.format(granularity.format()).to_string(),
        }
    }

    /// Hourly reference instant, e.g. `2024-05-01T14`.
    pub fn hourly(now: NaiveDateTime) -> Self {
        Self::from_datetime(now, Granularity::Hourly)
    }

    /// Truncate a provider timestamp such as `2024-05-01T14:15`.
    pub fn from_timestamp(timestamp: &str, granularity: Granularity) -> Self {
        Self {
            prefix: timestamp.chars().take(granularity.prefix_len()).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, timestamp: &str) -> bool {
        timestamp.starts_with(&self.prefix)
    }
}

impl std::fmt::Display for ReferenceInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Where a window starts and how long it may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub start_index: usize,
    pub window_size: usize,
    /// `false` when no timestamp matched and the window fell back to index 0.
    pub matched: bool,
}

impl Alignment {
    /// `[start_index, start_index + window_size)` clipped to `values`.
    pub fn slice<'a, T>(&self, values: &'a [T]) -> &'a [T] {
        let start = self.start_index.min(values.len());
        let end = self
            .start_index
            .saturating_add(self.window_size)
            .min(values.len());
        &values[start..end]
    }
}

/// Locate the alignment point of `timestamps` for `reference`.
pub fn align<S: AsRef<str>>(
    timestamps: &[S],
    reference: &ReferenceInstant,
    window_size: usize,
) -> Alignment {
    match timestamps.iter().position(|t| reference.matches(t.as_ref())) {
        Some(start_index) => Alignment {
            start_index,
            window_size,
            matched: true,
        },
        None => {
            if !timestamps.is_empty() {
                tracing::debug!(
                    reference = %reference,
                    first = timestamps[0].as_ref(),
                    "No timestamp matches reference instant, falling back to index 0"
                );
            }
            Alignment {
                start_index: 0,
                window_size,
                matched: false,
            }
        }
    }
}

/// A forward window cut from an [`HourlySeries`].
///
/// Each sequence is sliced independently with the same alignment, so index
/// `i` still refers to the same instant everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyWindow {
    pub start_index: usize,
    pub aligned: bool,
    pub time: Vec<String>,
    pub temperature: Vec<f64>,
    pub apparent_temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub wind_gusts: Vec<f64>,
    pub weather_code: Vec<i32>,
}

/// One row of a window with every value present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gusts: f64,
    pub weather_code: i32,
}

impl HourlyPoint {
    /// `HH:MM` part of the timestamp.
    pub fn time_label(&self) -> &str {
        time_label(&self.time)
    }
}

/// `HH:MM` part of an ISO-8601 timestamp, or the whole string if too short.
pub fn time_label(timestamp: &str) -> &str {
    timestamp.get(11..16).unwrap_or(timestamp)
}

impl HourlyWindow {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Whether the window is anchored at the reference hour.
    pub fn is_aligned(&self) -> bool {
        self.aligned && !self.is_empty()
    }

    /// Zipped rows, stopping at the shortest sequence.
    pub fn points(&self) -> impl Iterator<Item = HourlyPoint> + '_ {
        let rows = [
            self.time.len(),
            self.temperature.len(),
            self.apparent_temperature.len(),
            self.humidity.len(),
            self.wind_speed.len(),
            self.wind_gusts.len(),
            self.weather_code.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);

        (0..rows).map(move |i| HourlyPoint {
            time: self.time[i].clone(),
            temperature: self.temperature[i],
            apparent_temperature: self.apparent_temperature[i],
            humidity: self.humidity[i],
            wind_speed: self.wind_speed[i],
            wind_gusts: self.wind_gusts[i],
            weather_code: self.weather_code[i],
        })
    }
}

/// Cut a `window_size` forward window from `series` at `reference`.
pub fn hourly_window(
    series: &HourlySeries,
    reference: &ReferenceInstant,
    window_size: usize,
) -> HourlyWindow {
    let alignment = align(&series.time, reference, window_size);
    HourlyWindow {
        start_index: alignment.start_index,
        aligned: alignment.matched,
        time: alignment.slice(&series.time).to_vec(),
        temperature: alignment.slice(&series.temperature).to_vec(),
        apparent_temperature: alignment.slice(&series.apparent_temperature).to_vec(),
        humidity: alignment.slice(&series.humidity).to_vec(),
        wind_speed: alignment.slice(&series.wind_speed).to_vec(),
        wind_gusts: alignment.slice(&series.wind_gusts).to_vec(),
        weather_code: alignment.slice(&series.weather_code).to_vec(),
    }
}
