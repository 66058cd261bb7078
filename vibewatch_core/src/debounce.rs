//! Minimum-interval gate for physical accelerometer reads.

use std::time::Duration;

/// Gates reads to at most one per `min_interval`.
///
/// Time is the monitor timeline (elapsed since start). A debouncer that has
/// never been reset permits the first read.
#[derive(Debug, Clone)]
pub struct SampleDebouncer {
    min_interval: Duration,
    last_reset: Option<Duration>,
}

impl SampleDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_reset: None,
        }
    }

    /// True iff `elapsed` since the last successful read is at least the minimum interval.
    #[inline]
    pub fn should_sample(&self, elapsed: Duration) -> bool {
        elapsed >= self.min_interval
    }

    /// Whether a read is allowed at `now`.
    pub fn permits(&self, now: Duration) -> bool {
        match self.elapsed(now) {
            Some(elapsed) => self.should_sample(elapsed),
            None => true,
        }
    }

    /// Restart the debounce clock at `now`.
    pub fn reset(&mut self, now: Duration) {
        self.last_reset = Some(now);
    }

    /// Time since the last reset, if any.
    pub fn elapsed(&self, now: Duration) -> Option<Duration> {
        self.last_reset.map(|t| now.saturating_sub(t))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
