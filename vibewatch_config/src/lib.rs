#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and trace parsing for the vibration monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; a missing section takes its defaults.
//! - The accelerometer trace CSV loader enforces headers and rejects
//!   non-finite values before the trace is replayed by the simulator.
use serde::Deserialize;

/// Accelerometer trace CSV schema.
///
/// Expected headers:
/// x,y,z
///
/// Example:
/// x,y,z
/// 0.02,-0.01,1.00
/// 0.85,0.40,0.62
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TraceRow {
    pub fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Upper end of the vibration threshold knob range (g)
    pub vib_range_max: f32,
    /// Upper end of the temperature threshold knob range (°C)
    pub temp_range_max: f32,
    /// Non-zero value of the toggleable minimum vibration floor (g)
    pub min_floor: f32,
    /// Whether the floor starts at `min_floor` (true) or zero
    pub floor_enabled: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            vib_range_max: 2.0,
            temp_range_max: 60.0,
            min_floor: 0.16,
            floor_enabled: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Sample-start ticker period during normal operation
    pub sample_period_ms: u64,
    /// Sample-start ticker period after a log write has completed
    pub resume_period_ms: u64,
    /// Delay between the first and second accelerometer read
    pub second_read_delay_ms: u64,
    /// Minimum spacing between physical accelerometer reads
    pub debounce_ms: u64,
    /// Delay (and repeat period) of the vibration alarm colour
    pub vibration_visual_ms: u64,
    /// Delay (and repeat period) of the temperature alarm colour and tone
    pub temperature_effect_ms: u64,
    /// Delay before the alarm digital pin is asserted
    pub digital_pin_delay_us: u64,
    /// Period of the polling loop (thresholds, log writes, display)
    pub control_period_ms: u64,
    /// Time the startup messages stay on screen
    pub splash_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sample_period_ms: 33,
            resume_period_ms: 28,
            second_read_delay_ms: 15,
            debounce_ms: 10,
            vibration_visual_ms: 100,
            temperature_effect_ms: 500,
            digital_pin_delay_us: 10,
            control_period_ms: 500,
            splash_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Tone {
    /// Tone frequency per unit of activation vibration (Hz per g)
    pub hz_per_g: f32,
    /// PWM duty cycle of the speaker
    pub duty: f32,
    /// Activation vibration is clamped to at least this before computing the period
    pub min_activation: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            hz_per_g: 1000.0,
            duty: 0.5,
            min_activation: 0.001,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DisplayCfg {
    /// Panel shown at startup (0 = thresholds, 1 = readings, 2 = inputs)
    pub initial_panel: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Path of the vibration log file
    pub path: String,
    /// Interval between attempts to open storage at startup
    pub retry_ms: u64,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: "Vib.txt".to_string(),
            retry_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Fixed position of the temperature threshold knob (simulated backend)
    pub temperature_knob: f32,
    /// Fixed position of the vibration threshold knob (simulated backend)
    pub vibration_knob: f32,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            temperature_knob: 0.5,
            vibration_knob: 0.5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Seed of the accelerometer noise generator
    pub seed: u32,
    /// Peak amplitude of background noise per axis (g)
    pub noise_g: f32,
    /// A shake burst starts every this many ms (0 disables bursts)
    pub burst_every_ms: u64,
    /// Burst length in ms
    pub burst_len_ms: u64,
    /// Peak amplitude of a burst per axis (g)
    pub burst_g: f32,
    /// Starting temperature (°C)
    pub ambient_c: f32,
    /// Temperature rise per second of simulated time (°C/s)
    pub heating_c_per_s: f32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: 1,
            noise_g: 0.05,
            burst_every_ms: 3000,
            burst_len_ms: 200,
            burst_g: 1.5,
            ambient_c: 25.0,
            heating_c_per_s: 0.5,
        }
    }
}

/// Board wiring, used only by the `hardware` backend. BCM pin numbers.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Board {
    pub i2c_bus: u8,
    pub red_pin: u8,
    pub green_pin: u8,
    pub blue_pin: u8,
    pub speaker_pin: u8,
    pub alarm_output_pin: u8,
    pub log_closed_led_pin: u8,
    pub ready_led_pin: u8,
    pub floor_led_pin: u8,
    pub rotate_button_pin: u8,
    pub close_button_pin: u8,
    pub floor_button_pin: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            red_pin: 17,
            green_pin: 27,
            blue_pin: 22,
            speaker_pin: 18,
            alarm_output_pin: 23,
            log_closed_led_pin: 5,
            ready_led_pin: 6,
            floor_led_pin: 13,
            rotate_button_pin: 16,
            close_button_pin: 20,
            floor_button_pin: 21,
        }
    }
}

impl Board {
    pub fn pins(&self) -> [u8; 11] {
        [
            self.red_pin,
            self.green_pin,
            self.blue_pin,
            self.speaker_pin,
            self.alarm_output_pin,
            self.log_closed_led_pin,
            self.ready_led_pin,
            self.floor_led_pin,
            self.rotate_button_pin,
            self.close_button_pin,
            self.floor_button_pin,
        ]
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub timing: Timing,
    pub tone: Tone,
    pub display: DisplayCfg,
    pub storage: Storage,
    pub inputs: Inputs,
    pub simulation: Simulation,
    pub board: Board,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load an accelerometer trace for replay.
pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["x", "y", "z"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 'x,y,z', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !row.axes().iter().all(|v| v.is_finite()) {
                    eyre::bail!("trace CSV row {} has a non-finite value", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} has no rows", path);
    }
    Ok(rows)
}

fn in_unit(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Thresholds
        let t = &self.thresholds;
        if !(t.vib_range_max.is_finite() && t.vib_range_max > 0.0) {
            eyre::bail!("thresholds.vib_range_max must be > 0");
        }
        if !(t.temp_range_max.is_finite() && t.temp_range_max > 0.0) {
            eyre::bail!("thresholds.temp_range_max must be > 0");
        }
        if !(t.min_floor.is_finite() && t.min_floor > 0.0) {
            eyre::bail!("thresholds.min_floor must be > 0");
        }
        if t.min_floor >= t.vib_range_max {
            eyre::bail!("thresholds.min_floor must be below thresholds.vib_range_max");
        }

        // Timing
        let tm = &self.timing;
        if tm.second_read_delay_ms == 0 {
            eyre::bail!("timing.second_read_delay_ms must be >= 1");
        }
        if tm.sample_period_ms <= tm.second_read_delay_ms {
            eyre::bail!("timing.sample_period_ms must exceed timing.second_read_delay_ms");
        }
        if tm.resume_period_ms <= tm.second_read_delay_ms {
            eyre::bail!("timing.resume_period_ms must exceed timing.second_read_delay_ms");
        }
        if tm.resume_period_ms > tm.sample_period_ms {
            eyre::bail!("timing.resume_period_ms must not exceed timing.sample_period_ms");
        }
        if tm.debounce_ms > tm.second_read_delay_ms {
            eyre::bail!("timing.debounce_ms must not exceed timing.second_read_delay_ms");
        }
        if tm.vibration_visual_ms == 0 {
            eyre::bail!("timing.vibration_visual_ms must be >= 1");
        }
        if tm.temperature_effect_ms == 0 {
            eyre::bail!("timing.temperature_effect_ms must be >= 1");
        }
        if tm.control_period_ms == 0 {
            eyre::bail!("timing.control_period_ms must be >= 1");
        }
        if tm.control_period_ms > 60 * 1000 {
            eyre::bail!("timing.control_period_ms is unreasonably large (>1min)");
        }
        if tm.splash_ms > 60 * 1000 {
            eyre::bail!("timing.splash_ms is unreasonably large (>1min)");
        }

        // Tone
        if !(self.tone.hz_per_g.is_finite() && self.tone.hz_per_g > 0.0) {
            eyre::bail!("tone.hz_per_g must be > 0");
        }
        if !in_unit(self.tone.duty) {
            eyre::bail!("tone.duty must be in [0.0, 1.0]");
        }
        if !(self.tone.min_activation.is_finite() && self.tone.min_activation > 0.0) {
            eyre::bail!("tone.min_activation must be > 0");
        }

        // Storage
        if self.storage.path.trim().is_empty() {
            eyre::bail!("storage.path must not be empty");
        }
        if self.storage.retry_ms == 0 {
            eyre::bail!("storage.retry_ms must be >= 1");
        }

        // Inputs
        if !in_unit(self.inputs.temperature_knob) {
            eyre::bail!("inputs.temperature_knob must be in [0.0, 1.0]");
        }
        if !in_unit(self.inputs.vibration_knob) {
            eyre::bail!("inputs.vibration_knob must be in [0.0, 1.0]");
        }

        // Simulation
        let s = &self.simulation;
        if !(s.noise_g.is_finite() && s.noise_g >= 0.0) {
            eyre::bail!("simulation.noise_g must be >= 0");
        }
        if !(s.burst_g.is_finite() && s.burst_g >= 0.0) {
            eyre::bail!("simulation.burst_g must be >= 0");
        }
        if s.burst_every_ms > 0 && s.burst_len_ms >= s.burst_every_ms {
            eyre::bail!("simulation.burst_len_ms must be shorter than simulation.burst_every_ms");
        }
        if !s.ambient_c.is_finite() || !s.heating_c_per_s.is_finite() {
            eyre::bail!("simulation temperatures must be finite");
        }

        // Board: BCM numbering, every pin used once
        let pins = self.board.pins();
        if let Some(p) = pins.iter().find(|p| **p > 27) {
            eyre::bail!("board pin {p} is outside the BCM range 0..=27");
        }
        for (i, p) in pins.iter().enumerate() {
            if pins[..i].contains(p) {
                eyre::bail!("board pin {p} is assigned more than once");
            }
        }

        // Logging: rotation is restricted to known policies
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
