//! Runtime configuration for the monitor.
//!
//! These are the structs used by `Monitor`. They are separate from the
//! TOML-deserialized config in `vibewatch_config`; see `conversions`.

use std::time::Duration;

/// Sample-start ticker period during normal operation.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(33);
/// Sample-start ticker period once a log write has completed.
pub const RESUME_PERIOD: Duration = Duration::from_millis(28);
/// Spacing between the two reads of a dual-sample cycle.
pub const SECOND_READ_DELAY: Duration = Duration::from_millis(15);
/// Minimum spacing between physical accelerometer reads.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(10);
/// Delay and repeat period of the vibration alarm colour.
pub const VIBRATION_VISUAL_DELAY: Duration = Duration::from_millis(100);
/// Delay and repeat period of the temperature alarm colour and tone.
pub const TEMPERATURE_EFFECT_DELAY: Duration = Duration::from_millis(500);
/// Delay before the alarm digital pin is asserted.
pub const DIGITAL_PIN_DELAY: Duration = Duration::from_micros(10);
/// Period of the polling loop.
pub const CONTROL_PERIOD: Duration = Duration::from_millis(500);
/// Time the startup messages stay on screen.
pub const SPLASH: Duration = Duration::from_secs(1);
/// Interval between storage open attempts at startup.
pub const STORAGE_RETRY: Duration = Duration::from_millis(500);

/// Timer periods and delays.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    pub sample_period: Duration,
    pub resume_period: Duration,
    pub second_read_delay: Duration,
    pub debounce: Duration,
    pub vibration_visual: Duration,
    pub temperature_effect: Duration,
    pub digital_pin_delay: Duration,
    pub control_period: Duration,
    pub splash: Duration,
    pub storage_retry: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            sample_period: SAMPLE_PERIOD,
            resume_period: RESUME_PERIOD,
            second_read_delay: SECOND_READ_DELAY,
            debounce: DEBOUNCE_INTERVAL,
            vibration_visual: VIBRATION_VISUAL_DELAY,
            temperature_effect: TEMPERATURE_EFFECT_DELAY,
            digital_pin_delay: DIGITAL_PIN_DELAY,
            control_period: CONTROL_PERIOD,
            splash: SPLASH,
            storage_retry: STORAGE_RETRY,
        }
    }
}

impl TimingCfg {
    /// Reject timings that would let a new cycle start before the previous one completed.
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if self.second_read_delay.is_zero() {
            return Err("second_read_delay must be > 0");
        }
        if self.sample_period <= self.second_read_delay {
            return Err("sample_period must exceed second_read_delay");
        }
        if self.resume_period <= self.second_read_delay {
            return Err("resume_period must exceed second_read_delay");
        }
        if self.vibration_visual.is_zero() || self.temperature_effect.is_zero() {
            return Err("alarm effect periods must be > 0");
        }
        if self.control_period.is_zero() {
            return Err("control_period must be > 0");
        }
        Ok(())
    }
}

/// Threshold knob ranges and the minimum vibration floor.
#[derive(Debug, Clone)]
pub struct ThresholdCfg {
    /// Vibration threshold at full knob travel (g).
    pub vib_range_max: f32,
    /// Temperature threshold at full knob travel (°C).
    pub temp_range_max: f32,
    /// Non-zero floor value (g).
    pub min_floor: f32,
    /// Start with the floor raised.
    pub floor_enabled: bool,
}

impl Default for ThresholdCfg {
    fn default() -> Self {
        Self {
            vib_range_max: 2.0,
            temp_range_max: 60.0,
            min_floor: 0.16,
            floor_enabled: true,
        }
    }
}

impl ThresholdCfg {
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if !(self.vib_range_max.is_finite() && self.vib_range_max > 0.0) {
            return Err("vib_range_max must be > 0");
        }
        if !(self.temp_range_max.is_finite() && self.temp_range_max > 0.0) {
            return Err("temp_range_max must be > 0");
        }
        if !(self.min_floor.is_finite() && self.min_floor >= 0.0) {
            return Err("min_floor must be >= 0");
        }
        if self.min_floor >= self.vib_range_max {
            return Err("min_floor must be below vib_range_max");
        }
        Ok(())
    }
}

/// Temperature alarm tone.
#[derive(Debug, Clone)]
pub struct ToneCfg {
    /// Frequency per unit of activation vibration (Hz per g).
    pub hz_per_g: f32,
    /// Speaker duty cycle.
    pub duty: f32,
    /// Lower clamp for the activation vibration used in the period computation.
    pub min_activation: f32,
}

impl Default for ToneCfg {
    fn default() -> Self {
        Self {
            hz_per_g: 1000.0,
            duty: 0.5,
            min_activation: 0.001,
        }
    }
}

impl ToneCfg {
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if !(self.hz_per_g.is_finite() && self.hz_per_g > 0.0) {
            return Err("tone hz_per_g must be > 0");
        }
        if !(self.min_activation.is_finite() && self.min_activation > 0.0) {
            return Err("tone min_activation must be > 0");
        }
        if !(0.0..=1.0).contains(&self.duty) {
            return Err("tone duty must be in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_checks() {
        assert!(TimingCfg::default().check().is_ok());
        assert!(ThresholdCfg::default().check().is_ok());
        assert!(ToneCfg::default().check().is_ok());
    }

    #[test]
    fn overlapping_cycles_are_rejected() {
        let t = TimingCfg {
            resume_period: Duration::from_millis(15),
            ..TimingCfg::default()
        };
        assert_eq!(
            t.check(),
            Err("resume_period must exceed second_read_delay")
        );
    }
}
