//! Sliding-window admission control for outbound chat calls.
//!
//! A pure counting window: the ledger holds the instants of admitted calls
//! still inside the window, and a call is admitted while fewer than
//! `capacity` remain. Bursts up to capacity are allowed. Rejections are
//! reported back to the caller and never retried here.

use serde::Serialize;
use skywatch_config::ChatConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Shown to the user when a call is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrottleNotice {
    pub message: String,
    /// Time until the oldest admitted call ages out of the window.
    pub retry_after: Duration,
}

#[derive(Debug, Clone)]
pub struct InteractionRateLimiter {
    capacity: usize,
    window: Duration,
    ledger: VecDeque<Instant>,
}

impl InteractionRateLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            ledger: VecDeque::with_capacity(capacity),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit and record a call at `now`, or reject it.
    ///
    /// Entries with `now - entry >= window` are dropped first. A rejected
    /// call leaves the pruned ledger otherwise unchanged.
    pub fn try_admit(&mut self, now: Instant) -> bool {
        let window = self.window;
        self.ledger
            .retain(|t| now.saturating_duration_since(*t) < window);

        if self.ledger.len() >= self.capacity {
            return false;
        }

        self.ledger.push_back(now);
        true
    }

    /// How many more calls would be admitted at `now`.
    pub fn remaining(&self, now: Instant) -> usize {
        self.capacity.saturating_sub(self.live(now).count())
    }

    /// `None` when a call at `now` would be admitted.
    pub fn retry_after(&self, now: Instant) -> Option<Duration> {
        if self.remaining(now) > 0 {
            return None;
        }
        let oldest = self.live(now).min()?;
        Some(self.window.saturating_sub(now.saturating_duration_since(oldest)))
    }

    /// The notice for a call rejected at `now`.
    pub fn notice(&self, now: Instant) -> ThrottleNotice {
        let retry_after = self.retry_after(now).unwrap_or_default();
        let secs = retry_after.as_millis().div_ceil(1000).max(1);
        ThrottleNotice {
            message: format!(
                "You've reached the limit of {} messages per {}s. Please wait {secs}s before asking again.",
                self.capacity,
                self.window.as_secs()
            ),
            retry_after,
        }
    }

    fn live(&self, now: Instant) -> impl Iterator<Item = Instant> + '_ {
        self.ledger
            .iter()
            .copied()
            .filter(move |t| now.saturating_duration_since(*t) < self.window)
    }
}
