//! Live alarm thresholds from the two knobs and the minimum vibration floor.

use crate::config::ThresholdCfg;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThresholdPair {
    /// g
    pub vibration: f32,
    /// °C
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ThresholdController {
    cfg: ThresholdCfg,
    floor_raised: bool,
    /// Last (temperature, vibration) knob readings, normalized.
    inputs: (f32, f32),
    current: ThresholdPair,
}

/// Knob readings are clamped to [0, 1]; NaN reads as 0.
fn normalize(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl ThresholdController {
    pub fn new(cfg: ThresholdCfg) -> Self {
        let floor_raised = cfg.floor_enabled;
        Self {
            cfg,
            floor_raised,
            inputs: (0.0, 0.0),
            current: ThresholdPair::default(),
        }
    }

    /// Current floor: 0 or the configured minimum.
    pub fn floor(&self) -> f32 {
        if self.floor_raised {
            self.cfg.min_floor
        } else {
            0.0
        }
    }

    pub fn floor_raised(&self) -> bool {
        self.floor_raised
    }

    /// Flip the floor between 0 and the configured minimum and recompute the
    /// thresholds from the last knob readings. Returns the new state.
    pub fn toggle_floor(&mut self) -> bool {
        self.floor_raised = !self.floor_raised;
        let (temp_input, vib_input) = self.inputs;
        let pair = self.compute(temp_input, vib_input);
        tracing::info!(
            floor = self.floor(),
            vibration = pair.vibration,
            "minimum vibration floor toggled"
        );
        self.floor_raised
    }

    /// Recompute both thresholds from the knob positions.
    ///
    /// `temperature = temp_range_max × temp_input`,
    /// `vibration = floor + (vib_range_max − floor) × vib_input`.
    pub fn compute(&mut self, temp_input: f32, vib_input: f32) -> ThresholdPair {
        let floor = self.floor();
        self.inputs = (normalize(temp_input), normalize(vib_input));
        let pair = ThresholdPair {
            vibration: floor + (self.cfg.vib_range_max - floor) * normalize(vib_input),
            temperature: self.cfg.temp_range_max * normalize(temp_input),
        };
        if pair != self.current {
            tracing::trace!(
                vibration = pair.vibration,
                temperature = pair.temperature,
                "thresholds updated"
            );
        }
        self.current = pair;
        pair
    }

    /// Thresholds from the last `compute`.
    pub fn current(&self) -> ThresholdPair {
        self.current
    }
}
