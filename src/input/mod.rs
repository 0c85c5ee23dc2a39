//! Slider input coalescing for hosts that feed filter intensities.

use std::time::{Duration, Instant};

pub const DEFAULT_PARAM_DEBOUNCE: Duration = Duration::from_millis(50);

/// Trailing-edge debounce: the latest submitted value is released once no
/// newer value has arrived for `delay`. The editor core never depends on it.
#[derive(Debug, Clone)]
pub struct ParamDebouncer<T> {
    delay: Duration,
    pending: Option<T>,
    release_at: Option<Instant>,
}

impl<T> Default for ParamDebouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PARAM_DEBOUNCE)
    }
}

impl<T> ParamDebouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            release_at: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.release_at = Some(now + self.delay);
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.release_at?;
        if now < deadline {
            return None;
        }
        self.release_at = None;
        self.pending.take()
    }

    /// Releases the pending value immediately, e.g. on slider release.
    pub fn flush(&mut self) -> Option<T> {
        self.release_at = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.release_at = None;
        self.pending = None;
    }
}
