//! Which vibration samples reach persistent storage, and when.
//!
//! A sample is significant when its total reaches the minimum floor (not the
//! alarm threshold), so sub-alarm motion is kept while near-zero sensor noise
//! is dropped. A significant sample raises a write request and suspends
//! sampling; the control tick performs the write and resumes sampling.

use std::fmt::Write as _;

use crate::estimator::VibrationSample;

/// Header line written before the first record after a vibration alarm.
pub const ACTIVATION_MARKER: &str = "Activation Readings:";

/// `total >= floor`.
#[inline]
pub fn should_log(total: f32, floor: f32) -> bool {
    total >= floor
}

/// Render one record in the persisted line format.
pub fn format_record(sample: &VibrationSample, activation: bool) -> String {
    let mut out = String::with_capacity(96);
    if activation {
        let _ = write!(out, "{ACTIVATION_MARKER}\r\n");
    }
    let _ = write!(out, "xValue: {:.2}\r\n", sample.x);
    let _ = write!(out, "yValue: {:.2}\r\n", sample.y);
    let _ = write!(out, "zValue: {:.2}\r\n", sample.z);
    let _ = write!(out, "Total Vib: {:.2}\r\n\r\n", sample.total);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not significant (or logging is closed); sampling continues.
    Skip,
    /// Persist this sample; sampling must pause until the write completes.
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogState {
    #[default]
    Open,
    Closed,
}

/// Work the control tick has to do for the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    None,
    /// Write the pending sample, then resume sampling.
    Write,
    /// Close the log for good. `resume_sampling` is set when a write was
    /// still pending, since sampling was paused for it.
    Close { resume_sampling: bool },
}

#[derive(Debug, Clone, Default)]
pub struct LoggingGate {
    state: LogState,
    write_pending: bool,
    close_requested: bool,
    records_written: u64,
    write_failures: u64,
}

impl LoggingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the sample should be persisted.
    pub fn on_sample(&mut self, sample: &VibrationSample, floor: f32) -> GateDecision {
        if self.state == LogState::Closed {
            return GateDecision::Skip;
        }
        if should_log(sample.total, floor) {
            self.write_pending = true;
            GateDecision::Persist
        } else {
            GateDecision::Skip
        }
    }

    /// Raise the one-shot close request. Later requests are no-ops.
    pub fn request_close(&mut self) {
        if self.state == LogState::Open && !self.close_requested {
            tracing::info!("log close requested");
        }
        self.close_requested = true;
    }

    /// Called once per control tick. A close request wins over a pending write.
    pub fn next_action(&mut self) -> LogAction {
        if self.state == LogState::Closed {
            return LogAction::None;
        }
        if self.close_requested {
            self.state = LogState::Closed;
            let resume_sampling = std::mem::take(&mut self.write_pending);
            return LogAction::Close { resume_sampling };
        }
        if std::mem::take(&mut self.write_pending) {
            return LogAction::Write;
        }
        LogAction::None
    }

    pub fn record_written(&mut self) {
        self.records_written = self.records_written.saturating_add(1);
    }

    pub fn record_failed(&mut self) {
        self.write_failures = self.write_failures.saturating_add(1);
    }

    pub fn state(&self) -> LogState {
        self.state
    }

    pub fn write_pending(&self) -> bool {
        self.write_pending
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total: f32) -> VibrationSample {
        VibrationSample {
            x: total,
            y: 0.0,
            z: 0.0,
            total,
        }
    }

    #[test]
    fn floor_is_inclusive() {
        assert!(should_log(0.16, 0.16));
        assert!(!should_log(0.1, 0.16));
        assert!(should_log(0.2, 0.16));
        assert!(should_log(0.0, 0.0));
    }

    #[test]
    fn record_format_matches_log_layout() {
        let s = VibrationSample {
            x: 0.125,
            y: -1.0,
            z: 2.0,
            total: 2.2396,
        };
        assert_eq!(
            format_record(&s, false),
            "xValue: 0.12\r\nyValue: -1.00\r\nzValue: 2.00\r\nTotal Vib: 2.24\r\n\r\n"
        );
        assert!(format_record(&s, true).starts_with("Activation Readings:\r\nxValue"));
    }

    #[test]
    fn significant_sample_requests_write_once() {
        let mut g = LoggingGate::new();
        assert_eq!(g.on_sample(&sample(0.05), 0.16), GateDecision::Skip);
        assert_eq!(g.next_action(), LogAction::None);
        assert_eq!(g.on_sample(&sample(0.3), 0.16), GateDecision::Persist);
        assert!(g.write_pending());
        assert_eq!(g.next_action(), LogAction::Write);
        assert_eq!(g.next_action(), LogAction::None);
    }

    #[test]
    fn close_wins_and_happens_once() {
        let mut g = LoggingGate::new();
        g.on_sample(&sample(1.0), 0.0);
        g.request_close();
        assert_eq!(
            g.next_action(),
            LogAction::Close {
                resume_sampling: true
            }
        );
        assert_eq!(g.state(), LogState::Closed);
        g.request_close();
        assert_eq!(g.next_action(), LogAction::None);
        // Closed gate never asks for writes again.
        assert_eq!(g.on_sample(&sample(5.0), 0.0), GateDecision::Skip);
        assert_eq!(g.next_action(), LogAction::None);
    }
}
