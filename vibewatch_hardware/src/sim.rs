//! Simulated sensors, knobs and actuators for running without the board.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use vibewatch_traits::clock::Clock;
use vibewatch_traits::{
    Accelerometer, Actuators, AnalogInput, Axes, Rgb, StatusLed, Thermometer,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shape of the simulated signals.
#[derive(Debug, Clone)]
pub struct SimProfile {
    pub seed: u32,
    /// Peak background noise per axis (g).
    pub noise_g: f32,
    /// A shake burst starts every this long; zero disables bursts.
    pub burst_every: Duration,
    pub burst_len: Duration,
    /// Peak burst amplitude per axis (g).
    pub burst_g: f32,
    pub ambient_c: f32,
    pub heating_c_per_s: f32,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            seed: 1,
            noise_g: 0.05,
            burst_every: Duration::from_secs(3),
            burst_len: Duration::from_millis(200),
            burst_g: 1.5,
            ambient_c: 25.0,
            heating_c_per_s: 0.5,
        }
    }
}

impl SimProfile {
    /// Whether `t` falls inside a shake burst.
    pub fn in_burst(&self, t: Duration) -> bool {
        if self.burst_every.is_zero() || self.burst_len.is_zero() {
            return false;
        }
        let every = self.burst_every.as_nanos();
        let phase = t.as_nanos() % every;
        // The first window opens one full period in.
        t.as_nanos() >= every && phase < self.burst_len.as_nanos()
    }
}

/// xorshift32, uniform in [-1, 1).
#[derive(Debug, Clone)]
struct Noise(u32);

impl Noise {
    fn next(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x as f32) / (u32::MAX as f32 + 1.0) * 2.0 - 1.0
    }
}

/// Accelerometer at rest under 1 g with noise and periodic shake bursts.
pub struct SimulatedAccelerometer<C: Clock> {
    profile: SimProfile,
    clock: C,
    epoch: Instant,
    noise: Noise,
}

impl<C: Clock> SimulatedAccelerometer<C> {
    pub fn new(profile: SimProfile, clock: C) -> Self {
        let epoch = clock.now();
        let noise = Noise(profile.seed.max(1));
        Self {
            profile,
            clock,
            epoch,
            noise,
        }
    }
}

impl<C: Clock> Accelerometer for SimulatedAccelerometer<C> {
    fn read_axes(&mut self) -> Result<Axes, BoxError> {
        let t = self.clock.since(self.epoch);
        let amp = if self.profile.in_burst(t) {
            self.profile.burst_g
        } else {
            self.profile.noise_g
        };
        let axes = [
            self.noise.next() * amp,
            self.noise.next() * amp,
            1.0 + self.noise.next() * amp,
        ];
        tracing::trace!(?t, x = axes[0], y = axes[1], z = axes[2], "simulated accelerometer");
        Ok(axes)
    }
}

/// Accelerometer replaying recorded readings in order, wrapping at the end.
#[derive(Debug, Clone)]
pub struct TraceAccelerometer {
    rows: Vec<Axes>,
    idx: usize,
}

impl TraceAccelerometer {
    pub fn new(rows: Vec<Axes>) -> Self {
        Self { rows, idx: 0 }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Accelerometer for TraceAccelerometer {
    fn read_axes(&mut self) -> Result<Axes, BoxError> {
        let Some(row) = self.rows.get(self.idx).copied() else {
            return Err("trace is empty".into());
        };
        self.idx = (self.idx + 1) % self.rows.len();
        Ok(row)
    }

    fn probe(&mut self) -> bool {
        !self.rows.is_empty()
    }
}

/// Thermometer warming linearly from ambient.
pub struct SimulatedThermometer<C: Clock> {
    ambient_c: f32,
    heating_c_per_s: f32,
    clock: C,
    epoch: Instant,
}

impl<C: Clock> SimulatedThermometer<C> {
    pub fn new(profile: &SimProfile, clock: C) -> Self {
        let epoch = clock.now();
        Self {
            ambient_c: profile.ambient_c,
            heating_c_per_s: profile.heating_c_per_s,
            clock,
            epoch,
        }
    }
}

impl<C: Clock> Thermometer for SimulatedThermometer<C> {
    fn read_celsius(&mut self) -> Result<f32, BoxError> {
        let secs = self.clock.since(self.epoch).as_secs_f32();
        Ok(self.ambient_c + self.heating_c_per_s * secs)
    }
}

/// Knob whose position can be moved from another thread.
#[derive(Debug, Clone)]
pub struct SharedKnob(Arc<AtomicU32>);

impl SharedKnob {
    pub fn new(level: f32) -> Self {
        let knob = Self(Arc::new(AtomicU32::new(0)));
        knob.set(level);
        knob
    }

    /// Clamped to `0.0..=1.0`; NaN is ignored.
    pub fn set(&self, level: f32) {
        if level.is_nan() {
            return;
        }
        self.0
            .store(level.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl AnalogInput for SharedKnob {
    fn read_normalized(&mut self) -> f32 {
        self.get()
    }
}

/// Actuators reported through `tracing`; repeated identical writes are not logged.
#[derive(Debug, Default)]
pub struct ConsoleActuators {
    indicator: Option<Rgb>,
    audio_period: Option<f32>,
    audio_duty: Option<f32>,
    digital_output: bool,
    leds: [bool; 3],
}

impl ConsoleActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator(&self) -> Option<Rgb> {
        self.indicator
    }

    pub fn audio_period(&self) -> Option<f32> {
        self.audio_period
    }

    pub fn digital_output(&self) -> bool {
        self.digital_output
    }

    pub fn status_led(&self, led: StatusLed) -> bool {
        self.leds[led_index(led)]
    }
}

fn led_index(led: StatusLed) -> usize {
    match led {
        StatusLed::LogClosed => 0,
        StatusLed::Ready => 1,
        StatusLed::FloorActive => 2,
    }
}

impl Actuators for ConsoleActuators {
    fn set_indicator(&mut self, color: Rgb) {
        if self.indicator != Some(color) {
            tracing::info!(r = color.r, g = color.g, b = color.b, "indicator");
            self.indicator = Some(color);
        }
    }

    fn set_audio_period(&mut self, seconds: f32) {
        if self.audio_period != Some(seconds) {
            tracing::info!(period_s = seconds, hz = 1.0 / seconds, "speaker period");
            self.audio_period = Some(seconds);
        }
    }

    fn set_audio_duty(&mut self, duty: f32) {
        if self.audio_duty != Some(duty) {
            tracing::info!(duty, "speaker duty");
            self.audio_duty = Some(duty);
        }
    }

    fn set_digital_output(&mut self, high: bool) {
        if self.digital_output != high {
            tracing::info!(high, "alarm output");
            self.digital_output = high;
        }
    }

    fn set_status_led(&mut self, led: StatusLed, on: bool) {
        let slot = &mut self.leds[led_index(led)];
        if *slot != on {
            tracing::info!(?led, on, "status led");
            *slot = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibewatch_traits::clock::test_clock::TestClock;

    #[test]
    fn quiet_readings_stay_near_gravity() {
        let clock = TestClock::new();
        let mut acc = SimulatedAccelerometer::new(SimProfile::default(), clock.clone());
        for _ in 0..100 {
            let [x, y, z] = acc.read_axes().unwrap();
            assert!(x.abs() <= 0.051 && y.abs() <= 0.051);
            assert!((z - 1.0).abs() <= 0.051);
            clock.advance(Duration::from_millis(15));
        }
    }

    #[test]
    fn bursts_open_periodically() {
        let p = SimProfile::default();
        assert!(!p.in_burst(Duration::from_millis(100)));
        assert!(p.in_burst(Duration::from_millis(3_050)));
        assert!(!p.in_burst(Duration::from_millis(3_250)));
        assert!(p.in_burst(Duration::from_millis(6_000)));
        let off = SimProfile {
            burst_every: Duration::ZERO,
            ..SimProfile::default()
        };
        assert!(!off.in_burst(Duration::from_millis(3_050)));
    }

    #[test]
    fn trace_wraps_around() {
        let mut t = TraceAccelerometer::new(vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let xs: Vec<f32> = (0..3).map(|_| t.read_axes().unwrap()[0]).collect();
        assert_eq!(xs, vec![1.0, 2.0, 1.0]);
        let mut empty = TraceAccelerometer::new(Vec::new());
        assert!(!empty.probe());
        assert!(empty.read_axes().is_err());
    }

    #[test]
    fn thermometer_warms_with_time() {
        let clock = TestClock::new();
        let mut th = SimulatedThermometer::new(&SimProfile::default(), clock.clone());
        assert_eq!(th.read_celsius().unwrap(), 25.0);
        clock.advance(Duration::from_secs(10));
        assert!((th.read_celsius().unwrap() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn shared_knob_clamps_and_shares() {
        let knob = SharedKnob::new(0.25);
        let mut reader = knob.clone();
        knob.set(1.7);
        assert_eq!(reader.read_normalized(), 1.0);
        knob.set(f32::NAN);
        assert_eq!(reader.read_normalized(), 1.0);
    }

    #[test]
    fn console_actuators_track_state() {
        let mut a = ConsoleActuators::new();
        a.set_indicator(Rgb::VIBRATION);
        a.set_status_led(StatusLed::Ready, true);
        a.set_digital_output(true);
        assert_eq!(a.indicator(), Some(Rgb::VIBRATION));
        assert!(a.status_led(StatusLed::Ready));
        assert!(!a.status_led(StatusLed::LogClosed));
        assert!(a.digital_output());
    }
}
