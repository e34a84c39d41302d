//! Delayed busy indicator shown while code runs.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BusyIndicator {
    delay: Duration,
    started: Option<Instant>,
    shown: bool,
}

impl BusyIndicator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: None,
            shown: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.shown = false;
    }

    pub fn stop(&mut self) {
        if self.shown {
            log::trace!("busy indicator hidden");
        }
        self.started = None;
        self.shown = false;
    }

    /// Shows the indicator once the delay has elapsed. Returns whether it is shown.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(started) = self.started {
            if !self.shown && now.duration_since(started) >= self.delay {
                self.shown = true;
                log::trace!("busy indicator shown");
            }
        }
        self.shown
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_pending(&self) -> bool {
        self.started.is_some()
    }
}
