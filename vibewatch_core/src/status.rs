//! Read-only views of the monitor returned to callers.

use std::time::Duration;

use crate::alarm::AlarmLatch;
use crate::estimator::{EstimatorPhase, VibrationSample};
use crate::logging_gate::LogState;
use crate::thresholds::ThresholdPair;

/// Point-in-time state of a [`Monitor`](crate::Monitor).
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    pub phase: EstimatorPhase,
    pub vibration_alarm: AlarmLatch,
    pub temperature_alarm: AlarmLatch,
    /// Total vibration captured when the vibration alarm tripped.
    pub activation_vibration: Option<f32>,
    pub thresholds: ThresholdPair,
    pub min_floor: f32,
    pub sample: VibrationSample,
    pub temperature: f32,
    pub log_state: LogState,
    pub write_pending: bool,
    /// Current period of the sample-start ticker; `None` while suspended.
    pub sample_period: Option<Duration>,
    pub display_choice: usize,
    pub cycles: u64,
    pub records_written: u64,
}

impl MonitorSnapshot {
    pub fn sampling_active(&self) -> bool {
        self.sample_period.is_some()
    }
}

/// What bring-up found before the event loop started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    /// Number of storage open attempts, including the successful one.
    pub storage_attempts: u32,
    pub accelerometer_connected: bool,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub startup: StartupReport,
    /// Monitor timeline length, bring-up excluded.
    pub elapsed: Duration,
    pub cycles: u64,
    pub control_ticks: u64,
    pub records_written: u64,
    pub write_failures: u64,
    pub failed_reads: u64,
    pub vibration_alarm: bool,
    pub temperature_alarm: bool,
    pub activation_vibration: Option<f32>,
    pub log_closed: bool,
}
