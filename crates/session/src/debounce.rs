//! Debounced location search.
//!
//! A [`QueryDebouncer`] runs as one tokio task that owns all search state:
//!
//! ```text
//! on_input ──mpsc──▶ ┌──────────────────────────┐ ──watch──▶ SearchState
//!                    │ select! over             │
//!                    │  - new input             │
//!                    │  - debounce deadline     │
//!                    │  - finished lookups      │
//!                    └──────────────────────────┘
//! ```
//!
//! Each keystroke replaces the pending deadline. When it expires the trimmed
//! query is dispatched with a fresh ticket. Lookups already in flight are not
//! cancelled; their results are dropped when a newer ticket exists.

use serde::Serialize;
use skywatch_config::{FallbackMode, SearchConfig};
use skywatch_core::{fallback_candidates, Geocoder, LocationCandidate, ProviderError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::sequence::{SequenceGate, Ticket};

/// Warning shown in [`FallbackMode::Warn`] when the geocoder is unreachable.
pub const DEGRADED_WARNING: &str =
    "Location search is unavailable right now; showing offline suggestions.";

/// Result of a single lookup, after fallback substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub candidates: Vec<LocationCandidate>,
    /// `true` when `candidates` is the fixed offline set.
    pub degraded: bool,
    pub failure: Option<ProviderError>,
}

/// Query the geocoder, substituting the offline set on any failure.
pub async fn resolve_search(geocoder: &dyn Geocoder, query: &str) -> SearchOutcome {
    match geocoder.lookup(query).await {
        Ok(candidates) => SearchOutcome {
            candidates,
            degraded: false,
            failure: None,
        },
        Err(e) => {
            warn!(geocoder = geocoder.name(), query, error = %e, "Geocoding failed, using offline candidates");
            SearchOutcome {
                candidates: fallback_candidates(),
                degraded: true,
                failure: Some(e),
            }
        }
    }
}

/// Outcome published when a lookup task dies before producing a result.
fn task_failure_outcome(e: &JoinError) -> SearchOutcome {
    SearchOutcome {
        candidates: fallback_candidates(),
        degraded: true,
        failure: Some(ProviderError::InvalidResponse(format!("location search aborted: {e}"))),
    }
}

/// What the search box renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Raw text as typed.
    pub query: String,
    pub candidates: Vec<LocationCandidate>,
    pub loading: bool,
    pub degraded: bool,
    pub error: Option<String>,
}

enum Command {
    Input(String),
    Shutdown,
}

pub struct QueryDebouncer {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    fallback_mode: FallbackMode,
}

impl QueryDebouncer {
    pub fn new(geocoder: Arc<dyn Geocoder>, delay: Duration, fallback_mode: FallbackMode) -> Self {
        Self {
            geocoder,
            delay,
            fallback_mode,
        }
    }

    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &SearchConfig) -> Self {
        Self::new(
            geocoder,
            Duration::from_millis(config.debounce_ms),
            config.fallback_mode,
        )
    }

    /// Start the search task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> SearchHandle {
        let (commands, input) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SearchState::default());
        let task = tokio::spawn(self.run(input, state_tx));
        SearchHandle {
            commands,
            state,
            task,
        }
    }

    async fn run(self, mut input: mpsc::UnboundedReceiver<Command>, state: watch::Sender<SearchState>) {
        let mut gate = SequenceGate::new();
        let mut in_flight: JoinSet<SearchOutcome> = JoinSet::new();
        let mut tickets: HashMap<task::Id, Ticket> = HashMap::new();
        let mut pending: Option<(Instant, String)> = None;

        loop {
            let deadline = pending.as_ref().map(|(at, _)| *at);

            tokio::select! {
                biased;

                command = input.recv() => match command {
                    Some(Command::Input(text)) => {
                        let query = text.trim().to_string();
                        if query.is_empty() {
                            pending = None;
                            // Invalidate anything still in flight.
                            gate.issue();
                            state.send_modify(|s| *s = SearchState { query: text, ..SearchState::default() });
                        } else {
                            pending = Some((Instant::now() + self.delay, query));
                            state.send_modify(|s| s.query = text);
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                },

                _ = wait_until(deadline) => {
                    if let Some((_, query)) = pending.take() {
                        let ticket = gate.issue();
                        debug!(query = %query, ticket = ticket.value(), "Dispatching location search");
                        state.send_modify(|s| s.loading = true);

                        let geocoder = Arc::clone(&self.geocoder);
                        let lookup = in_flight.spawn(async move {
                            resolve_search(geocoder.as_ref(), &query).await
                        });
                        tickets.insert(lookup.id(), ticket);
                    }
                },

                Some(joined) = in_flight.join_next_with_id(), if !in_flight.is_empty() => {
                    let (id, outcome) = match joined {
                        Ok(done) => done,
                        Err(e) => {
                            warn!(error = %e, "Location search task failed, using offline candidates");
                            (e.id(), task_failure_outcome(&e))
                        }
                    };
                    let Some(ticket) = tickets.remove(&id) else {
                        continue;
                    };
                    if !gate.is_current(ticket) {
                        debug!(ticket = ticket.value(), "Discarding stale search result");
                        continue;
                    }
                    let error = match self.fallback_mode {
                        FallbackMode::Warn if outcome.degraded => Some(DEGRADED_WARNING.to_string()),
                        _ => None,
                    };
                    state.send_modify(|s| {
                        s.candidates = outcome.candidates;
                        s.degraded = outcome.degraded;
                        s.error = error;
                        s.loading = false;
                    });
                },
            }
        }

        in_flight.abort_all();
        debug!("Location search task stopped");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Handle to a running [`QueryDebouncer`]. Dropping it stops the task.
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl SearchHandle {
    /// Feed a keystroke's worth of text. Returns `false` once the task stopped.
    pub fn on_input(&self, text: impl Into<String>) -> bool {
        self.commands.send(Command::Input(text.into())).is_ok()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Location search task ended abnormally");
        }
    }
}
