//! Forecast state for the single active location.
//!
//! Fetches are sequence-numbered the same way searches are: a result is only
//! applied when its ticket is still the newest. Derived views are cached and
//! rebuilt only when the data or the reference hour changes.
//!
//! Hourly timestamps are in the location's own timezone, so the reference
//! hour comes from the provider's `current.time`. The caller's clock is only
//! used when the document has no usable current reading.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use skywatch_config::ForecastConfig;
use skywatch_core::{
    CurrentReading, DailyPeaks, ForecastDocument, ForecastSource, LocationCandidate, ProviderError,
};
use skywatch_forecast::{
    alert_rows, hourly_window, is_daytime, table_rows, AlertRow, GroundingInput, HourlyWindow,
    ReferenceInstant, RiskAssessment, TableRow,
};
use tracing::{debug, warn};

use crate::sequence::{SequenceGate, Ticket};

/// Everything the dashboard renders for one reference hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    #[serde(skip)]
    pub reference: ReferenceInstant,
    pub window: HourlyWindow,
    pub peaks: Option<DailyPeaks>,
    pub risk: Option<RiskAssessment>,
    pub alerts: Vec<AlertRow>,
    pub table: Vec<TableRow>,
    pub is_daytime: bool,
}

/// Local wall-clock time at the location, falling back to `now`.
pub fn location_time(document: &ForecastDocument, now: NaiveDateTime) -> NaiveDateTime {
    document
        .current
        .as_ref()
        .and_then(|c| NaiveDateTime::parse_from_str(&c.time, PROVIDER_TIME_FORMAT).ok())
        .unwrap_or(now)
}

const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

impl DashboardView {
    fn derive(document: &ForecastDocument, now: NaiveDateTime, window_hours: usize) -> Self {
        let local = location_time(document, now);
        let reference = ReferenceInstant::hourly(local);
        let window = hourly_window(&document.hourly, &reference, window_hours);
        let peaks = document.daily.today_peaks();

        Self {
            risk: peaks.as_ref().map(RiskAssessment::from_peaks),
            alerts: peaks.as_ref().map(|p| alert_rows(p).to_vec()).unwrap_or_default(),
            table: table_rows(&window),
            is_daytime: is_daytime(local.hour()),
            reference,
            window,
            peaks,
        }
    }
}

#[derive(Debug)]
struct CachedView {
    revision: u64,
    view: DashboardView,
}

#[derive(Debug)]
pub struct ForecastStore {
    window_hours: usize,
    gate: SequenceGate,
    location: Option<LocationCandidate>,
    document: Option<ForecastDocument>,
    loading: bool,
    error: Option<String>,
    revision: u64,
    cache: Option<CachedView>,
    empty_window: HourlyWindow,
}

impl ForecastStore {
    pub fn new(window_hours: usize) -> Self {
        Self {
            window_hours,
            gate: SequenceGate::new(),
            location: None,
            document: None,
            loading: false,
            error: None,
            revision: 0,
            cache: None,
            empty_window: HourlyWindow::default(),
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.window_hours)
    }

    /// Start a fetch for `location`. Data for a different location is
    /// dropped immediately so it is never shown under the new name.
    pub fn begin(&mut self, location: &LocationCandidate) -> Ticket {
        if self.location.as_ref() != Some(location) {
            self.location = Some(location.clone());
            self.document = None;
            self.touch();
        }
        self.loading = true;
        self.error = None;
        self.gate.issue()
    }

    /// Apply a finished fetch. Returns `false` if `ticket` was superseded.
    pub fn apply(&mut self, ticket: Ticket, result: Result<ForecastDocument, ProviderError>) -> bool {
        if !self.gate.is_current(ticket) {
            debug!(ticket = ticket.value(), "Discarding stale forecast");
            return false;
        }

        self.loading = false;
        match result {
            Ok(document) => {
                self.document = Some(document);
                self.error = None;
                self.touch();
            }
            Err(e) => {
                warn!(error = %e, "Forecast fetch failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch and apply in one step.
    pub async fn refresh(&mut self, source: &dyn ForecastSource, location: &LocationCandidate) -> bool {
        let ticket = self.begin(location);
        debug!(source = source.name(), location = %location.display_name(), "Refreshing forecast");
        let result = source.fetch(location.latitude, location.longitude).await;
        self.apply(ticket, result)
    }

    /// The derived view at `now`, or `None` before the first successful fetch.
    pub fn view(&mut self, now: NaiveDateTime) -> Option<&DashboardView> {
        let document = self.document.as_ref()?;
        let reference = ReferenceInstant::hourly(location_time(document, now));

        let stale = self
            .cache
            .as_ref()
            .is_none_or(|c| c.revision != self.revision || c.view.reference != reference);
        if stale {
            self.cache = Some(CachedView {
                revision: self.revision,
                view: DashboardView::derive(document, now, self.window_hours),
            });
        }

        self.cache.as_ref().map(|c| &c.view)
    }

    /// Inputs for one grounding payload at `now`.
    pub fn grounding_input(&mut self, now: NaiveDateTime) -> GroundingInput<'_> {
        self.view(now);
        let view = self.cache.as_ref().filter(|_| self.document.is_some()).map(|c| &c.view);

        GroundingInput {
            current: self.current(),
            window: view.map_or(&self.empty_window, |v| &v.window),
            daily_peaks: view.and_then(|v| v.peaks.as_ref()),
            now_local: self.document.as_ref().map_or(now, |d| location_time(d, now)),
        }
    }

    pub fn location(&self) -> Option<&LocationCandidate> {
        self.location.as_ref()
    }

    pub fn document(&self) -> Option<&ForecastDocument> {
        self.document.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentReading> {
        self.document.as_ref().and_then(|d| d.current.as_ref())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use skywatch_core::{DailySeries, HourlySeries};
    use skywatch_forecast::SeverityLevel;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 20, 0)
            .unwrap()
    }

    fn document(hours: usize) -> ForecastDocument {
        let start = at(0) - Duration::minutes(20);
        let time: Vec<String> = (0..hours)
            .map(|h| (start + Duration::hours(h as i64)).format("%Y-%m-%dT%H:%M").to_string())
            .collect();
        let values: Vec<f64> = (0..hours).map(|h| h as f64).collect();
        ForecastDocument {
            current: Some(CurrentReading {
                time: "2026-03-01T10:15".into(),
                temperature: 24.0,
                apparent_temperature: 26.0,
                humidity: 80.0,
                wind_speed: 10.0,
                weather_code: 61,
                is_day: 1,
            }),
            hourly: HourlySeries {
                time,
                temperature: values.clone(),
                apparent_temperature: values.clone(),
                humidity: values.clone(),
                wind_speed: values.clone(),
                wind_gusts: values,
                weather_code: vec![3; hours],
            },
            daily: DailySeries {
                time: vec!["2026-03-01".into()],
                uv_index_max: vec![7.0],
                precipitation_probability_max: vec![10.0],
                wind_gusts_max: vec![10.0],
            },
            ..ForecastDocument::default()
        }
    }

    fn guayaquil() -> LocationCandidate {
        LocationCandidate::new("Guayaquil", "EC", None, -2.1962, -79.8862)
    }

    #[test]
    fn view_is_none_until_data_arrives() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        assert!(store.is_loading());
        assert!(store.view(at(10)).is_none());

        assert!(store.apply(ticket, Ok(document(48))));
        assert!(!store.is_loading());
        let view = store.view(at(10)).unwrap();
        assert_eq!(view.window.len(), 24);
        assert_eq!(view.window.time[0], "2026-03-01T10:00");
        assert_eq!(view.risk.unwrap().level, SeverityLevel::Elevated);
        assert_eq!(view.alerts.len(), 3);
        assert!(view.is_daytime);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut store = ForecastStore::new(24);
        let old = store.begin(&guayaquil());
        let new = store.begin(&guayaquil());

        assert!(!store.apply(old, Ok(document(48))));
        assert!(store.document().is_none());
        assert!(store.apply(new, Ok(document(24))));
        assert_eq!(store.document().unwrap().hourly.time.len(), 24);
    }

    #[test]
    fn location_change_clears_data() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        store.apply(ticket, Ok(document(48)));
        assert!(store.view(at(10)).is_some());

        let quito = LocationCandidate::new("Quito", "EC", None, -0.1807, -78.4678);
        store.begin(&quito);
        assert!(store.document().is_none());
        assert!(store.view(at(10)).is_none());
    }

    #[test]
    fn same_location_keeps_data_while_refreshing() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        store.apply(ticket, Ok(document(48)));

        store.begin(&guayaquil());
        assert!(store.document().is_some());
        assert!(store.is_loading());
    }

    #[test]
    fn failure_records_error_and_keeps_no_data() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        assert!(store.apply(ticket, Err(ProviderError::Network("offline".into()))));
        assert!(store.error().unwrap().contains("offline"));
        assert!(store.view(at(10)).is_none());
        assert!(store.grounding_input(at(10)).current.is_none());
    }

    #[test]
    fn view_follows_host_clock_without_current_reading() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        store.apply(
            ticket,
            Ok(ForecastDocument {
                current: None,
                ..document(48)
            }),
        );

        let first = store.view(at(10)).unwrap().clone();
        assert_eq!(first.window.time[0], "2026-03-01T10:00");
        assert_eq!(store.view(at(10)).unwrap(), &first);

        let later = store.view(at(19)).unwrap();
        assert_eq!(later.window.time[0], "2026-03-01T19:00");
        assert!(!later.is_daytime);
    }

    #[test]
    fn location_time_wins_over_host_clock() {
        let mut doc = document(48);
        if let Some(current) = doc.current.as_mut() {
            current.time = "2026-03-01T19:15".into();
        }
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        store.apply(ticket, Ok(doc));

        // Host clock says 10:20; the location is at 19:15 local.
        let view = store.view(at(10)).unwrap();
        assert_eq!(view.window.start_index, 19);
        assert_eq!(view.window.time[0], "2026-03-01T19:00");
        assert!(!view.is_daytime);

        let input = store.grounding_input(at(10));
        assert_eq!(input.now_local.format("%H:%M").to_string(), "19:15");
        assert_eq!(input.window.time[0], "2026-03-01T19:00");
    }

    #[test]
    fn unparseable_current_time_falls_back_to_host_clock() {
        let mut doc = document(48);
        if let Some(current) = doc.current.as_mut() {
            current.time = "soon".into();
        }
        assert_eq!(location_time(&doc, at(7)), at(7));
    }

    #[test]
    fn grounding_input_borrows_current_view() {
        let mut store = ForecastStore::new(24);
        let ticket = store.begin(&guayaquil());
        store.apply(ticket, Ok(document(48)));

        let input = store.grounding_input(at(10));
        assert_eq!(input.current.unwrap().weather_code, 61);
        assert!(input.window.is_aligned());
        assert!(input.daily_peaks.is_some());
    }
}
