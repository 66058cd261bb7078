//! Type-state builder for [`Monitor`].
//!
//! Sensors, actuators and the log store must be provided before `build()` is
//! available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use vibewatch_traits::{Accelerometer, Actuators, AnalogInput, Display, LogStore, Thermometer};

use crate::config::{ThresholdCfg, TimingCfg, ToneCfg};
use crate::display::DisplayRotor;
use crate::error::{BuildError, Result};
use crate::mocks::{FixedLevel, NullDisplay};
use crate::monitor::{Devices, Monitor};
use crate::thresholds::ThresholdController;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

#[derive(Default)]
struct Parts {
    accel: Option<Box<dyn Accelerometer>>,
    thermo: Option<Box<dyn Thermometer>>,
    actuators: Option<Box<dyn Actuators>>,
    log: Option<Box<dyn LogStore>>,
    display: Option<Box<dyn Display>>,
    temperature_knob: Option<Box<dyn AnalogInput>>,
    vibration_knob: Option<Box<dyn AnalogInput>>,
    timing: Option<TimingCfg>,
    thresholds: Option<ThresholdCfg>,
    tone: Option<ToneCfg>,
    initial_panel: usize,
}

/// Builder for `Monitor`. Configuration is validated on `build()`.
pub struct MonitorBuilder<S = Missing, A = Missing, L = Missing> {
    parts: Parts,
    _s: PhantomData<S>,
    _a: PhantomData<A>,
    _l: PhantomData<L>,
}

impl Default for MonitorBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            parts: Parts::default(),
            _s: PhantomData,
            _a: PhantomData,
            _l: PhantomData,
        }
    }
}

impl<S, A, L> MonitorBuilder<S, A, L> {
    fn advance<S2, A2, L2>(self) -> MonitorBuilder<S2, A2, L2> {
        MonitorBuilder {
            parts: self.parts,
            _s: PhantomData,
            _a: PhantomData,
            _l: PhantomData,
        }
    }

    /// Fallible build available in any type-state; returns a detailed error for missing pieces.
    pub fn try_build(self) -> Result<Monitor> {
        let p = self.parts;
        let (accel, thermo) = match (p.accel, p.thermo) {
            (Some(a), Some(t)) => (a, t),
            _ => return Err(eyre::Report::new(BuildError::MissingSensors)),
        };
        let actuators = p
            .actuators
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuators))?;
        let log = p
            .log
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStorage))?;

        let timing = p.timing.unwrap_or_default();
        let thresholds = p.thresholds.unwrap_or_default();
        let tone = p.tone.unwrap_or_default();
        timing
            .check()
            .map_err(|m| eyre::Report::new(BuildError::InvalidConfig(m)))?;
        thresholds
            .check()
            .map_err(|m| eyre::Report::new(BuildError::InvalidConfig(m)))?;
        tone.check()
            .map_err(|m| eyre::Report::new(BuildError::InvalidConfig(m)))?;

        let dev = Devices {
            accel,
            thermo,
            actuators,
            log,
            display: p.display.unwrap_or_else(|| Box::new(NullDisplay)),
            temperature_knob: p
                .temperature_knob
                .unwrap_or_else(|| Box::new(FixedLevel(0.5))),
            vibration_knob: p
                .vibration_knob
                .unwrap_or_else(|| Box::new(FixedLevel(0.5))),
        };
        Ok(Monitor::from_parts(
            dev,
            timing,
            ThresholdController::new(thresholds),
            tone,
            DisplayRotor::new(p.initial_panel),
        ))
    }
}

/// Chainable setters that do not affect type-state.
impl<S, A, L> MonitorBuilder<S, A, L> {
    pub fn with_display(mut self, display: impl Display + 'static) -> Self {
        self.parts.display = Some(Box::new(display));
        self
    }
    /// Temperature knob first, vibration knob second. Both default to mid-travel.
    pub fn with_inputs(
        mut self,
        temperature_knob: impl AnalogInput + 'static,
        vibration_knob: impl AnalogInput + 'static,
    ) -> Self {
        self.parts.temperature_knob = Some(Box::new(temperature_knob));
        self.parts.vibration_knob = Some(Box::new(vibration_knob));
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.parts.timing = Some(timing);
        self
    }
    pub fn with_thresholds(mut self, thresholds: ThresholdCfg) -> Self {
        self.parts.thresholds = Some(thresholds);
        self
    }
    pub fn with_tone(mut self, tone: ToneCfg) -> Self {
        self.parts.tone = Some(tone);
        self
    }
    pub fn with_initial_panel(mut self, panel: usize) -> Self {
        self.parts.initial_panel = panel;
        self
    }
}

// Setters that advance type-state
impl<A, L> MonitorBuilder<Missing, A, L> {
    pub fn with_sensors(
        mut self,
        accel: impl Accelerometer + 'static,
        thermo: impl Thermometer + 'static,
    ) -> MonitorBuilder<Set, A, L> {
        self.parts.accel = Some(Box::new(accel));
        self.parts.thermo = Some(Box::new(thermo));
        self.advance()
    }
}

impl<S, L> MonitorBuilder<S, Missing, L> {
    pub fn with_actuators(mut self, actuators: impl Actuators + 'static) -> MonitorBuilder<S, Set, L> {
        self.parts.actuators = Some(Box::new(actuators));
        self.advance()
    }
}

impl<S, A> MonitorBuilder<S, A, Missing> {
    pub fn with_log_store(mut self, log: impl LogStore + 'static) -> MonitorBuilder<S, A, Set> {
        self.parts.log = Some(Box::new(log));
        self.advance()
    }
}

impl MonitorBuilder<Set, Set, Set> {
    /// Validate and build. Only available once sensors, actuators and storage are set.
    pub fn build(self) -> Result<Monitor> {
        self.try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MemoryLog, RecordingActuators, ScriptedAccelerometer, SharedThermometer};

    #[test]
    fn try_build_reports_missing_pieces() {
        let err = Monitor::builder().try_build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingSensors)
        ));

        let err = Monitor::builder()
            .with_sensors(ScriptedAccelerometer::new([]), SharedThermometer::new(20.0))
            .with_actuators(RecordingActuators::new())
            .try_build()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingStorage)
        ));
    }

    #[test]
    fn invalid_timing_is_rejected() {
        let err = Monitor::builder()
            .with_sensors(ScriptedAccelerometer::new([]), SharedThermometer::new(20.0))
            .with_actuators(RecordingActuators::new())
            .with_log_store(MemoryLog::new())
            .with_timing(TimingCfg {
                sample_period: std::time::Duration::from_millis(10),
                ..TimingCfg::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        ));
    }
}
