use chrono::{Duration, NaiveDateTime};
use log::debug;
use std::sync::Arc;

use crate::models::NextPrayer;
use crate::prayer_times::fetcher::Refresher;
use crate::prayer_times::selector::next_prayer;
use crate::utils::format::{format_countdown, format_timestamp};

/// Remaining time to the next prayer as seen at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub next: Option<NextPrayer>,
    /// Unclamped `next.at - now`.
    raw: Duration,
}

impl Countdown {
    pub fn new(next: Option<NextPrayer>, now: NaiveDateTime) -> Self {
        let raw = next.map(|n| n.at - now).unwrap_or_else(Duration::zero);
        Self { next, raw }
    }

    pub fn empty() -> Self {
        Self {
            next: None,
            raw: Duration::zero(),
        }
    }

    /// Never negative.
    pub fn remaining(&self) -> Duration {
        self.raw.max(Duration::zero())
    }

    /// True on the tick that lands within a second of the prayer. Ticks are a
    /// second apart, so under jitter this can be missed.
    pub fn is_due(&self) -> bool {
        self.next.is_some() && self.raw >= Duration::zero() && self.raw <= Duration::seconds(1)
    }

    pub fn headline(&self) -> String {
        match &self.next {
            Some(next) => format!("Next: {} ({})", next.name, format_timestamp(next.at)),
            None => "Next: --".to_string(),
        }
    }

    pub fn clock(&self) -> String {
        match self.next {
            Some(_) => format_countdown(self.remaining()),
            None => "--:--:--".to_string(),
        }
    }
}

/// Per-second countdown driver. Reads the shared store and, while the store
/// is empty, fetches inline before selecting.
pub struct CountdownTicker {
    refresher: Arc<Refresher>,
}

impl CountdownTicker {
    pub fn new(refresher: Arc<Refresher>) -> Self {
        Self { refresher }
    }

    pub fn tick(&self, now: NaiveDateTime) -> Countdown {
        let store = self.refresher.store();
        if store.is_empty() {
            debug!("no prayer times yet, fetching inline");
            if let Err(e) = self.refresher.refresh_on(now.date()) {
                debug!("inline fetch failed: {}", e);
            }
        }
        let next = store.read(|schedule| next_prayer(schedule, now));
        Countdown::new(next, now)
    }
}
