pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One three-axis accelerometer reading (x, y, z), in g.
pub type Axes = [f32; 3];

/// Indicator colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Shown from power-up until an alarm fires.
    pub const STARTUP: Rgb = Rgb::new(1.0, 1.0, 1.0);
    /// Vibration alarm (yellow).
    pub const VIBRATION: Rgb = Rgb::new(1.0, 1.0, 0.0);
    /// Temperature alarm (cyan).
    pub const TEMPERATURE: Rgb = Rgb::new(0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Single-colour status LEDs next to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLed {
    /// Lit once the persistent log has been closed.
    LogClosed,
    /// Lit once storage is connected and the accelerometer has been probed.
    Ready,
    /// Mirrors the minimum vibration floor: lit when non-zero.
    FloorActive,
}

/// Edge-triggered digital inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdge {
    /// Cycle the informational panel.
    RotateDisplay,
    /// Request the persistent log to be closed for good.
    CloseLog,
    /// Flip the minimum vibration floor between zero and its configured value.
    ToggleFloor,
}

/// Everything the display needs to draw one panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayFrame {
    pub choice: usize,
    pub vibration_threshold: f32,
    pub temperature_threshold: f32,
    pub min_floor: f32,
    pub total_vibration: f32,
    pub axes: Axes,
    pub temperature: f32,
    pub temperature_input: f32,
    pub vibration_input: f32,
}

pub trait Accelerometer {
    fn read_axes(&mut self) -> Result<Axes, Box<dyn std::error::Error + Send + Sync>>;

    /// Whether the device answers on its bus. Absence is reported, not fatal.
    fn probe(&mut self) -> bool {
        true
    }
}

pub trait Thermometer {
    fn read_celsius(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Actuators {
    fn set_indicator(&mut self, color: Rgb);
    /// Audio PWM period in seconds.
    fn set_audio_period(&mut self, seconds: f32);
    /// Audio PWM duty cycle in `0.0..=1.0`.
    fn set_audio_duty(&mut self, duty: f32);
    fn set_digital_output(&mut self, high: bool);
    fn set_status_led(&mut self, led: StatusLed, on: bool);
}

/// A potentiometer-style input normalized to `0.0..=1.0`.
pub trait AnalogInput {
    fn read_normalized(&mut self) -> f32;
}

/// Append-only persistent log. `close` must be idempotent.
pub trait LogStore {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn append_record(&mut self, text: &str)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Display {
    /// Free-form status text (startup and connection messages).
    fn show_message(&mut self, text: &str);
    fn render(&mut self, frame: &DisplayFrame);
}
