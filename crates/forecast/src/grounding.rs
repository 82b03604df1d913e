//! Grounding payload assembly for the conversational service.
//!
//! Renders, in order:
//!
//! 1. **Current conditions** — temperature, apparent temperature, humidity,
//!    wind speed, and the WMO description with its raw code
//! 2. **Today's peaks** — UV, precipitation probability, gusts, and the risk tier
//! 3. **Hourly briefs** — one bracketed token per hour for the next
//!    `brief_hours` hours, only when the window is anchored at the current hour
//!
//! # Determinism
//!
//! The payload is a pure function of its inputs: no clock reads, no caching,
//! no diffing. Callers rebuild it for every outbound call.

use chrono::NaiveDateTime;
use skywatch_core::{CurrentReading, DailyPeaks};

use crate::aligner::{time_label, HourlyWindow};
use crate::display::format_reading;
use crate::risk::RiskAssessment;
use crate::wmo;

/// Payload used when no current reading has been fetched yet.
pub const NO_DATA_PAYLOAD: &str = "No synchronized weather data.";

/// Hourly briefs rendered unless configured otherwise.
pub const DEFAULT_BRIEF_HOURS: usize = 12;

// ── Types ─────────────────────────────────────────────────────────────────

/// All inputs required for one payload.
#[derive(Debug, Clone, Copy)]
pub struct GroundingInput<'a> {
    pub current: Option<&'a CurrentReading>,
    pub window: &'a HourlyWindow,
    pub daily_peaks: Option<&'a DailyPeaks>,
    /// Local wall-clock time of the request.
    pub now_local: NaiveDateTime,
}

/// Persona and instructions wrapped around the payload.
#[derive(Debug, Clone)]
pub struct Persona {
    pub preamble: String,
    pub instructions: Vec<String>,
}

impl Persona {
    pub fn named(assistant_name: &str) -> Self {
        Self {
            preamble: format!(
                "You are {assistant_name} 🦊, a precise and modern weather assistant."
            ),
            instructions: vec![
                "If asked about clothing or activities, base your recommendation on the data provided.".into(),
                "Be friendly, use emojis when they help, and keep a cheerful personality.".into(),
                "If the data does not cover the question, say so instead of guessing.".into(),
            ],
        }
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The grounding assembler. Stateless — create one and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    brief_hours: usize,
    persona: Persona,
}

impl ContextAssembler {
    pub fn new(brief_hours: usize, persona: Persona) -> Self {
        Self {
            brief_hours,
            persona,
        }
    }

    /// 12 hourly briefs and the default persona.
    pub fn with_defaults(assistant_name: &str) -> Self {
        Self::new(DEFAULT_BRIEF_HOURS, Persona::named(assistant_name))
    }

    /// Render the grounding payload.
    pub fn build_grounding_payload(&self, input: &GroundingInput<'_>) -> String {
        let Some(current) = input.current else {
            return NO_DATA_PAYLOAD.to_string();
        };

        let mut sections = vec![
            Self::render_current(current, input.now_local),
            Self::render_peaks(input.daily_peaks),
        ];

        let briefs = self.hourly_briefs(input.window);
        if !briefs.is_empty() {
            sections.push(format!(
                "[FORECAST NEXT {} HOURS]\n{}",
                briefs.len(),
                briefs.join(" ")
            ));
        }

        sections.join("\n\n")
    }

    /// One `[HH:MM: T°C, description]` token per hour after the aligned hour.
    ///
    /// Empty when the window fell back to index 0, since offsets would not be
    /// relative to "now".
    pub fn hourly_briefs(&self, window: &HourlyWindow) -> Vec<String> {
        if !window.is_aligned() {
            return Vec::new();
        }

        window
            .points()
            .skip(1)
            .take(self.brief_hours)
            .map(|p| {
                format!(
                    "[{}: {}°C, {}]",
                    time_label(&p.time),
                    format_reading(p.temperature),
                    wmo::describe(p.weather_code)
                )
            })
            .collect()
    }

    /// Wrap a payload in the persona and instructions.
    pub fn system_prompt(&self, payload: &str) -> String {
        let instructions = self
            .persona
            .instructions
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}. {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\nWEATHER CONTEXT:\n{}\n\nKEY INSTRUCTIONS:\n{}",
            self.persona.preamble, payload, instructions
        )
    }

    // ── Private section renderers ─────────────────────────────────────────

    fn render_current(current: &CurrentReading, now_local: NaiveDateTime) -> String {
        format!(
            "[CURRENT CONDITIONS - TIME {}]\n\
             - WMO code: {} ({})\n\
             - Temperature: {}°C\n\
             - Feels like: {}°C\n\
             - Humidity: {}%\n\
             - Wind: {} km/h",
            now_local.format("%H:%M"),
            current.weather_code,
            wmo::describe(current.weather_code),
            format_reading(current.temperature),
            format_reading(current.apparent_temperature),
            format_reading(current.humidity),
            format_reading(current.wind_speed),
        )
    }

    fn render_peaks(peaks: Option<&DailyPeaks>) -> String {
        match peaks {
            Some(p) => {
                let risk = RiskAssessment::from_peaks(p);
                format!(
                    "[TODAY'S PEAKS]\n\
                     - UV index max: {}\n\
                     - Precipitation probability max: {}%\n\
                     - Wind gusts max: {} km/h\n\
                     - Risk level: {} ({})",
                    format_reading(p.uv_index_max),
                    format_reading(p.precipitation_probability_max),
                    format_reading(p.wind_gusts_max),
                    risk.level.ordinal(),
                    risk.level.label(),
                )
            }
            None => "[TODAY'S PEAKS]\n- N/A".to_string(),
        }
    }
}

/// Render a payload with the default brief length.
pub fn build_grounding_payload(
    current: Option<&CurrentReading>,
    window: &HourlyWindow,
    daily_peaks: Option<&DailyPeaks>,
    now_local: NaiveDateTime,
) -> String {
    let assembler = ContextAssembler::new(DEFAULT_BRIEF_HOURS, Persona::named("SkyWatch"));
    assembler.build_grounding_payload(&GroundingInput {
        current,
        window,
        daily_peaks,
        now_local,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
