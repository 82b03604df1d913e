//! Pure forecast derivations for SkyWatch.
//!
//! Nothing in this crate does I/O or reads the clock; every function takes
//! its reference instant as an argument and is safe to call on every data
//! change or render tick.
//!
//! - [`aligner`] — forward windows aligned to "now"
//! - [`risk`] — three-tier hazard classification
//! - [`grounding`] — the text payload handed to the conversational service
//! - [`display`] — alert and table rows for the presentation layer

pub mod aligner;
pub mod display;
pub mod grounding;
pub mod risk;
pub mod wmo;

pub use aligner::{
    align, hourly_window, Alignment, Granularity, HourlyPoint, HourlyWindow, ReferenceInstant,
    DEFAULT_WINDOW_SIZE,
};
pub use display::{
    alert_rows, format_reading, is_daytime, table_rows, AlertDetail, AlertRow, TableRow,
    NOT_AVAILABLE,
};
pub use grounding::{
    build_grounding_payload, ContextAssembler, GroundingInput, Persona, DEFAULT_BRIEF_HOURS,
    NO_DATA_PAYLOAD,
};
pub use risk::{classify, MetricStatus, RiskAssessment, SeverityLevel, Thresholds};
pub use wmo::WeatherCondition;
