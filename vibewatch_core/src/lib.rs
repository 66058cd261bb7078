#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core vibration/temperature alarm logic (hardware-agnostic).
//!
//! All hardware interactions go through the capability traits in
//! `vibewatch_traits`. The [`Monitor`] owns every piece of mutable state and is
//! driven by typed events: timer fires, control ticks and input edges. The
//! [`runner::Runner`] feeds it from a [`Clock`](vibewatch_traits::Clock).
//!
//! ## Architecture
//!
//! - **Sampling**: debounced dual-read vibration estimate (`debounce`, `estimator`)
//! - **Alarms**: latched vibration then temperature alarm, tone plan (`alarm`)
//! - **Logging**: significant-sample gate and record format (`logging_gate`)
//! - **Thresholds**: knob mapping and minimum floor (`thresholds`)
//! - **Scheduling**: named one-shot/periodic timers (`timers`)
//! - **Display**: panel rotation (`display`)

pub mod alarm;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod debounce;
pub mod display;
pub mod error;
pub mod estimator;
pub mod hw_error;
pub mod logging_gate;
pub mod mocks;
pub mod monitor;
pub mod runner;
pub mod status;
pub mod thresholds;
pub mod timers;

pub use alarm::{AlarmKind, AlarmLatch, AlarmTransition, ThresholdAlarmEngine, TonePlan};
pub use builder::{Missing, MonitorBuilder, Set};
pub use config::{ThresholdCfg, TimingCfg, ToneCfg};
pub use debounce::SampleDebouncer;
pub use display::{DisplayRotor, PANEL_COUNT};
pub use error::{BuildError, MonitorError, Report, Result};
pub use estimator::{DualSampleVibrationEstimator, EstimatorPhase, VibrationSample};
pub use logging_gate::{ACTIVATION_MARKER, LogState, LoggingGate, format_record, should_log};
pub use monitor::Monitor;
pub use runner::Runner;
pub use status::{MonitorSnapshot, RunSummary, StartupReport};
pub use thresholds::{ThresholdController, ThresholdPair};
pub use timers::{TimerCommand, TimerId, Timers};
