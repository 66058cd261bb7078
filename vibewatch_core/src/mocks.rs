//! In-memory capabilities for tests, benches and dry runs.
//!
//! Stateful mocks share their state through `Rc<RefCell<_>>`, so a test can
//! keep a clone and inspect it after handing the mock to the monitor.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use vibewatch_traits::{
    Accelerometer, Actuators, AnalogInput, Axes, Display, DisplayFrame, LogStore, Rgb, StatusLed,
    Thermometer,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Display that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn show_message(&mut self, _text: &str) {}
    fn render(&mut self, _frame: &DisplayFrame) {}
}

/// Knob stuck at one position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLevel(pub f32);

impl AnalogInput for FixedLevel {
    fn read_normalized(&mut self) -> f32 {
        self.0
    }
}

/// Knob whose position the test can move.
#[derive(Debug, Clone, Default)]
pub struct SharedLevel(Rc<Cell<f32>>);

impl SharedLevel {
    pub fn new(v: f32) -> Self {
        Self(Rc::new(Cell::new(v)))
    }
    pub fn set(&self, v: f32) {
        self.0.set(v);
    }
}

impl AnalogInput for SharedLevel {
    fn read_normalized(&mut self) -> f32 {
        self.0.get()
    }
}

/// Accelerometer replaying a script of readings; repeats the last one when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedAccelerometer {
    script: VecDeque<Axes>,
    last: Axes,
    connected: bool,
    reads: Rc<Cell<u64>>,
}

impl ScriptedAccelerometer {
    pub fn new(script: impl IntoIterator<Item = Axes>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: [0.0; 3],
            connected: true,
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// Produce readings so each dual-sample cycle yields the given total along x.
    ///
    /// Each total becomes a pair: a rest reading followed by the displaced one.
    pub fn from_totals(totals: impl IntoIterator<Item = f32>) -> Self {
        Self::new(
            totals
                .into_iter()
                .flat_map(|t| [[0.0, 0.0, 1.0], [t, 0.0, 1.0]]),
        )
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Shared read counter.
    pub fn reads(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.reads)
    }
}

impl Accelerometer for ScriptedAccelerometer {
    fn read_axes(&mut self) -> Result<Axes, BoxError> {
        self.reads.set(self.reads.get() + 1);
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }

    fn probe(&mut self) -> bool {
        self.connected
    }
}

/// Thermometer whose reading the test can change.
#[derive(Debug, Clone, Default)]
pub struct SharedThermometer(Rc<Cell<f32>>);

impl SharedThermometer {
    pub fn new(celsius: f32) -> Self {
        Self(Rc::new(Cell::new(celsius)))
    }
    pub fn set(&self, celsius: f32) {
        self.0.set(celsius);
    }
}

impl Thermometer for SharedThermometer {
    fn read_celsius(&mut self) -> Result<f32, BoxError> {
        Ok(self.0.get())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLogState {
    pub records: Vec<String>,
    pub open: bool,
    pub open_attempts: u32,
    pub close_calls: u32,
    /// Remaining `open` calls that fail before one succeeds.
    pub open_failures: u32,
    pub fail_appends: bool,
}

/// Log store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog(Rc<RefCell<MemoryLogState>>);

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose first `n` opens report the medium as missing.
    pub fn failing_opens(n: u32) -> Self {
        let log = Self::default();
        log.0.borrow_mut().open_failures = n;
        log
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.0.borrow_mut().fail_appends = fail;
    }

    pub fn records(&self) -> Vec<String> {
        self.0.borrow().records.clone()
    }

    /// Everything written so far, concatenated.
    pub fn contents(&self) -> String {
        self.0.borrow().records.concat()
    }

    pub fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    pub fn open_attempts(&self) -> u32 {
        self.0.borrow().open_attempts
    }

    pub fn close_calls(&self) -> u32 {
        self.0.borrow().close_calls
    }
}

impl LogStore for MemoryLog {
    fn open(&mut self) -> Result<(), BoxError> {
        let mut s = self.0.borrow_mut();
        s.open_attempts += 1;
        if s.open_failures > 0 {
            s.open_failures -= 1;
            return Err("storage not mounted".into());
        }
        s.open = true;
        Ok(())
    }

    fn append_record(&mut self, text: &str) -> Result<(), BoxError> {
        let mut s = self.0.borrow_mut();
        if !s.open {
            return Err("log is not open".into());
        }
        if s.fail_appends {
            return Err(Box::new(std::io::Error::other("write failed")));
        }
        s.records.push(text.to_owned());
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        let mut s = self.0.borrow_mut();
        s.close_calls += 1;
        s.open = false;
        Ok(())
    }
}

/// Last value written to every actuator output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActuatorState {
    pub indicator: Option<Rgb>,
    pub indicator_writes: u32,
    pub audio_period: Option<f32>,
    pub audio_duty: f32,
    pub digital_output: bool,
    pub log_closed_led: bool,
    pub ready_led: bool,
    pub floor_led: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingActuators(Rc<RefCell<ActuatorState>>);

impl RecordingActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActuatorState {
        self.0.borrow().clone()
    }
}

impl Actuators for RecordingActuators {
    fn set_indicator(&mut self, color: Rgb) {
        let mut s = self.0.borrow_mut();
        s.indicator = Some(color);
        s.indicator_writes += 1;
    }

    fn set_audio_period(&mut self, seconds: f32) {
        self.0.borrow_mut().audio_period = Some(seconds);
    }

    fn set_audio_duty(&mut self, duty: f32) {
        self.0.borrow_mut().audio_duty = duty;
    }

    fn set_digital_output(&mut self, high: bool) {
        self.0.borrow_mut().digital_output = high;
    }

    fn set_status_led(&mut self, led: StatusLed, on: bool) {
        let mut s = self.0.borrow_mut();
        match led {
            StatusLed::LogClosed => s.log_closed_led = on,
            StatusLed::Ready => s.ready_led = on,
            StatusLed::FloorActive => s.floor_led = on,
        }
    }
}

/// Display that keeps every message and frame it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    messages: Rc<RefCell<Vec<String>>>,
    frames: Rc<RefCell<Vec<DisplayFrame>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.frames.borrow().clone()
    }

    pub fn last_frame(&self) -> Option<DisplayFrame> {
        self.frames.borrow().last().copied()
    }
}

impl Display for RecordingDisplay {
    fn show_message(&mut self, text: &str) {
        self.messages.borrow_mut().push(text.to_owned());
    }

    fn render(&mut self, frame: &DisplayFrame) {
        self.frames.borrow_mut().push(*frame);
    }
}
