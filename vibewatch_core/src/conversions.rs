//! `From` implementations bridging `vibewatch_config` types to `vibewatch_core` types.

use std::time::Duration;

use crate::config::{STORAGE_RETRY, ThresholdCfg, TimingCfg, ToneCfg};

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&vibewatch_config::Timing> for TimingCfg {
    fn from(c: &vibewatch_config::Timing) -> Self {
        Self {
            sample_period: Duration::from_millis(c.sample_period_ms),
            resume_period: Duration::from_millis(c.resume_period_ms),
            second_read_delay: Duration::from_millis(c.second_read_delay_ms),
            debounce: Duration::from_millis(c.debounce_ms),
            vibration_visual: Duration::from_millis(c.vibration_visual_ms),
            temperature_effect: Duration::from_millis(c.temperature_effect_ms),
            digital_pin_delay: Duration::from_micros(c.digital_pin_delay_us),
            control_period: Duration::from_millis(c.control_period_ms),
            splash: Duration::from_millis(c.splash_ms),
            storage_retry: STORAGE_RETRY,
        }
    }
}

/// Timing plus the storage retry interval, which lives in `[storage]`.
impl From<&vibewatch_config::Config> for TimingCfg {
    fn from(c: &vibewatch_config::Config) -> Self {
        Self {
            storage_retry: Duration::from_millis(c.storage.retry_ms),
            ..TimingCfg::from(&c.timing)
        }
    }
}

// ── ThresholdCfg ─────────────────────────────────────────────────────────────

impl From<&vibewatch_config::Thresholds> for ThresholdCfg {
    fn from(c: &vibewatch_config::Thresholds) -> Self {
        Self {
            vib_range_max: c.vib_range_max,
            temp_range_max: c.temp_range_max,
            min_floor: c.min_floor,
            floor_enabled: c.floor_enabled,
        }
    }
}

// ── ToneCfg ──────────────────────────────────────────────────────────────────

impl From<&vibewatch_config::Tone> for ToneCfg {
    fn from(c: &vibewatch_config::Tone) -> Self {
        Self {
            hz_per_g: c.hz_per_g,
            duty: c.duty,
            min_activation: c.min_activation,
        }
    }
}
