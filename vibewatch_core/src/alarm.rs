//! Latched vibration and temperature alarms.
//!
//! Both latches start `Idle` and can only move to `Triggered`. There is no
//! reset: once tripped, an alarm stays on until the process restarts. The
//! temperature alarm is armed only after the vibration alarm has tripped.

use crate::config::{TimingCfg, ToneCfg};
use crate::timers::{TimerCommand, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmLatch {
    #[default]
    Idle,
    Triggered,
}

impl AlarmLatch {
    pub fn is_triggered(self) -> bool {
        self == AlarmLatch::Triggered
    }

    /// Idle → Triggered. Returns whether the transition happened.
    fn trip(&mut self) -> bool {
        let was_idle = *self == AlarmLatch::Idle;
        *self = AlarmLatch::Triggered;
        was_idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    Vibration,
    Temperature,
}

/// Outcome of one [`ThresholdAlarmEngine::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlarmTransition {
    None,
    VibrationTriggered { activation: f32 },
    TemperatureTriggered,
}

impl AlarmTransition {
    /// Actuator effects to schedule for this transition.
    pub fn timer_commands(&self, timing: &TimingCfg) -> Vec<TimerCommand> {
        match self {
            AlarmTransition::None => Vec::new(),
            AlarmTransition::VibrationTriggered { .. } => vec![TimerCommand::every(
                TimerId::VibrationVisual,
                timing.vibration_visual,
            )],
            AlarmTransition::TemperatureTriggered => vec![
                TimerCommand::Detach(TimerId::VibrationVisual),
                TimerCommand::once(TimerId::DigitalPin, timing.digital_pin_delay),
                TimerCommand::every(TimerId::TemperatureEffect, timing.temperature_effect),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdAlarmEngine {
    vibration: AlarmLatch,
    temperature: AlarmLatch,
    activation_vibration: Option<f32>,
    new_activation: bool,
}

impl ThresholdAlarmEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one completed sample against the live thresholds.
    ///
    /// The temperature branch takes precedence; at most one latch trips per call.
    pub fn evaluate(
        &mut self,
        total_vibration: f32,
        temperature: f32,
        vib_threshold: f32,
        temp_threshold: f32,
    ) -> AlarmTransition {
        if self.watching_temperature() && temperature > temp_threshold {
            self.temperature.trip();
            tracing::info!(
                temperature,
                temp_threshold,
                activation = ?self.activation_vibration,
                "temperature alarm triggered"
            );
            AlarmTransition::TemperatureTriggered
        } else if !self.vibration.is_triggered() && total_vibration > vib_threshold {
            self.activation_vibration = Some(total_vibration);
            self.vibration.trip();
            self.new_activation = true;
            tracing::info!(
                total_vibration,
                vib_threshold,
                "vibration alarm triggered"
            );
            AlarmTransition::VibrationTriggered {
                activation: total_vibration,
            }
        } else {
            AlarmTransition::None
        }
    }

    /// Vibration has tripped and temperature has not: the only state in which
    /// a temperature reading can change anything.
    pub fn watching_temperature(&self) -> bool {
        self.vibration.is_triggered() && !self.temperature.is_triggered()
    }

    pub fn latch(&self, kind: AlarmKind) -> AlarmLatch {
        match kind {
            AlarmKind::Vibration => self.vibration,
            AlarmKind::Temperature => self.temperature,
        }
    }

    /// Total vibration captured when the vibration alarm tripped.
    pub fn activation_vibration(&self) -> Option<f32> {
        self.activation_vibration
    }

    /// Whether the next log record should carry the activation marker.
    pub fn new_activation_pending(&self) -> bool {
        self.new_activation
    }

    /// Consume the activation marker flag.
    pub fn take_new_activation(&mut self) -> bool {
        std::mem::take(&mut self.new_activation)
    }
}

/// Speaker settings for the temperature alarm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePlan {
    /// PWM period in seconds.
    pub period_s: f32,
    pub duty: f32,
    /// The activation vibration was below the minimum and has been clamped.
    pub clamped: bool,
}

impl TonePlan {
    /// period = 1 / (activation × hz_per_g), with the activation clamped to
    /// `min_activation` so the division is always defined.
    pub fn for_activation(activation: f32, tone: &ToneCfg) -> Self {
        let floor = tone.min_activation;
        let (effective, clamped) = if activation.is_finite() && activation >= floor {
            (activation, false)
        } else {
            (floor, true)
        };
        Self {
            period_s: 1.0 / (effective * tone.hz_per_g),
            duty: tone.duty,
            clamped,
        }
    }
}
