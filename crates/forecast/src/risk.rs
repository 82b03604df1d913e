//! Three-tier hazard classification from today's peak values.
//!
//! Each metric is tiered independently with closed lower bounds, checked
//! from the highest tier down:
//!
//! | Metric | High | Medium | Low |
//! |--------|------|--------|-----|
//! | UV index | ≥ 6 | ≥ 3 | otherwise |
//! | Precipitation probability (%) | ≥ 80 | ≥ 50 | otherwise |
//! | Wind gusts (km/h) | ≥ 60 | ≥ 40 | otherwise |
//!
//! The overall level is the maximum tier; one hazardous metric dominates.

use serde::Serialize;
use skywatch_core::DailyPeaks;

/// Overall severity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Safe = 1,
    Moderate = 2,
    Elevated = 3,
}

impl SeverityLevel {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe conditions",
            Self::Moderate => "Moderate caution",
            Self::Elevated => "Elevated risk",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Safe => "🛡️",
            Self::Moderate => "⚠️",
            Self::Elevated => "🚨",
        }
    }
}

/// Status of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Low,
    Medium,
    High,
}

impl MetricStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// The severity tier this status contributes.
    pub fn severity(self) -> SeverityLevel {
        match self {
            Self::Low => SeverityLevel::Safe,
            Self::Medium => SeverityLevel::Moderate,
            Self::High => SeverityLevel::Elevated,
        }
    }
}

/// Closed lower bounds for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    pub const UV_INDEX: Self = Self { medium: 3.0, high: 6.0 };
    pub const PRECIPITATION_PROBABILITY: Self = Self { medium: 50.0, high: 80.0 };
    pub const WIND_GUSTS: Self = Self { medium: 40.0, high: 60.0 };

    /// NaN fails both comparisons and ranks low.
    pub fn status(&self, value: f64) -> MetricStatus {
        if value >= self.high {
            MetricStatus::High
        } else if value >= self.medium {
            MetricStatus::Medium
        } else {
            MetricStatus::Low
        }
    }
}

/// Overall level plus the per-metric reasons behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub level: SeverityLevel,
    pub uv: MetricStatus,
    pub rain: MetricStatus,
    pub gust: MetricStatus,
}

impl RiskAssessment {
    pub fn from_peaks(peaks: &DailyPeaks) -> Self {
        classify(
            peaks.uv_index_max,
            peaks.precipitation_probability_max,
            peaks.wind_gusts_max,
        )
    }
}

/// Classify today's peaks. Total over every `f64` triple.
pub fn classify(uv_max: f64, rain_prob_max: f64, gust_max: f64) -> RiskAssessment {
    let uv = Thresholds::UV_INDEX.status(uv_max);
    let rain = Thresholds::PRECIPITATION_PROBABILITY.status(rain_prob_max);
    let gust = Thresholds::WIND_GUSTS.status(gust_max);

    let level = uv.severity().max(rain.severity()).max(gust.severity());

    RiskAssessment {
        level,
        uv,
        rain,
        gust,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hazard_dominates() {
        assert_eq!(classify(7.0, 10.0, 10.0).level, SeverityLevel::Elevated);
        assert_eq!(classify(1.0, 85.0, 0.0).level, SeverityLevel::Elevated);
        assert_eq!(classify(0.0, 0.0, 75.0).level, SeverityLevel::Elevated);
    }

    #[test]
    fn all_low_is_safe() {
        let r = classify(1.0, 1.0, 1.0);
        assert_eq!(r.level, SeverityLevel::Safe);
        assert_eq!(r.level.ordinal(), 1);
        assert_eq!((r.uv, r.rain, r.gust), (MetricStatus::Low, MetricStatus::Low, MetricStatus::Low));
    }

    #[test]
    fn two_medium_metrics_stay_moderate() {
        let r = classify(4.0, 60.0, 1.0);
        assert_eq!(r.level, SeverityLevel::Moderate);
        assert_eq!(r.uv, MetricStatus::Medium);
        assert_eq!(r.rain, MetricStatus::Medium);
        assert_eq!(r.gust, MetricStatus::Low);
    }

    #[test]
    fn bounds_are_closed() {
        assert_eq!(Thresholds::UV_INDEX.status(3.0), MetricStatus::Medium);
        assert_eq!(Thresholds::UV_INDEX.status(6.0), MetricStatus::High);
        assert_eq!(Thresholds::UV_INDEX.status(2.999), MetricStatus::Low);
        assert_eq!(Thresholds::PRECIPITATION_PROBABILITY.status(50.0), MetricStatus::Medium);
        assert_eq!(Thresholds::PRECIPITATION_PROBABILITY.status(80.0), MetricStatus::High);
        assert_eq!(Thresholds::WIND_GUSTS.status(40.0), MetricStatus::Medium);
        assert_eq!(Thresholds::WIND_GUSTS.status(60.0), MetricStatus::High);
    }

    #[test]
    fn level_is_max_of_metric_tiers() {
        let samples = [-5.0, 0.0, 2.9, 3.0, 5.5, 6.0, 39.0, 40.0, 50.0, 59.9, 60.0, 80.0, 120.0];
        for &uv in &samples {
            for &rain in &samples {
                for &gust in &samples {
                    let r = classify(uv, rain, gust);
                    let expected = r
                        .uv
                        .severity()
                        .max(r.rain.severity())
                        .max(r.gust.severity());
                    assert_eq!(r.level, expected, "uv={uv} rain={rain} gust={gust}");
                }
            }
        }
    }

    #[test]
    fn nan_ranks_low() {
        let r = classify(f64::NAN, f64::NAN, f64::NAN);
        assert_eq!(r.level, SeverityLevel::Safe);
    }

    #[test]
    fn from_peaks_matches_classify() {
        let peaks = DailyPeaks {
            uv_index_max: 6.5,
            precipitation_probability_max: 20.0,
            wind_gusts_max: 45.0,
        };
        assert_eq!(RiskAssessment::from_peaks(&peaks), classify(6.5, 20.0, 45.0));
    }
}
