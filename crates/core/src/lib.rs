//! # SkyWatch Core
//!
//! Domain types, traits, and error definitions for SkyWatch.
//! This crate has **no network code** — it defines the domain model that the
//! forecast, provider, and session crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`] — the conversational (chat completion) service
//! - [`ForecastSource`] — the forecast provider
//! - [`Geocoder`] — the free-text location search provider
//!
//! Implementations live in `skywatch-providers`, which keeps the session
//! layer testable with in-memory doubles.

pub mod error;
pub mod forecast;
pub mod location;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result};
pub use forecast::{CurrentReading, DailyPeaks, DailySeries, ForecastDocument, ForecastSource, HourlySeries};
pub use location::{fallback_candidates, round_coordinate, Geocoder, LocationCandidate};
pub use message::{Conversation, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
