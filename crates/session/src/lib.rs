//! Session layer for SkyWatch.
//!
//! Ties the pure forecast derivations to the external collaborators:
//!
//! - [`QueryDebouncer`] — debounced, latest-wins location search
//! - [`ForecastStore`] — forecast for the active location plus cached views
//! - [`ChatSession`] — grounded chat behind an [`InteractionRateLimiter`]
//! - [`Services`] — HTTP clients built from `AppConfig`

pub mod chat;
pub mod debounce;
pub mod forecast_store;
pub mod rate_limit;
pub mod sequence;
pub mod services;

pub use chat::{ChatOutcome, ChatSession, OFFLINE_REPLY, SUGGESTIONS};
pub use debounce::{
    resolve_search, QueryDebouncer, SearchHandle, SearchOutcome, SearchState, DEGRADED_WARNING,
};
pub use forecast_store::{location_time, DashboardView, ForecastStore};
pub use rate_limit::{InteractionRateLimiter, ThrottleNotice};
pub use sequence::{SequenceGate, Ticket};
pub use services::Services;

/// Install a `fmt` subscriber honouring `RUST_LOG`.
///
/// Defaults to `info`, or `debug` when `verbose`. Calling it again after a
/// subscriber is installed does nothing.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .try_init();
}
