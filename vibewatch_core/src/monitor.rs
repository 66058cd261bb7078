//! The monitor: owned state plus the handlers driven by timers, control ticks
//! and input edges.
//!
//! Nothing here sleeps or reads the wall clock. Every handler takes the
//! timeline position (`Duration` since start) it runs at, so the same code is
//! driven by the real-time runner and by tests stepping virtual time.

use std::time::Duration;

use vibewatch_traits::{
    Accelerometer, Actuators, AnalogInput, Display, DisplayFrame, InputEdge, LogStore, Rgb,
    StatusLed, Thermometer,
};

use crate::alarm::{AlarmKind, AlarmTransition, ThresholdAlarmEngine, TonePlan};
use crate::builder::MonitorBuilder;
use crate::config::{TimingCfg, ToneCfg};
use crate::display::DisplayRotor;
use crate::error::MonitorError;
use crate::estimator::{DualSampleVibrationEstimator, VibrationSample};
use crate::hw_error::map_hw_error;
use crate::logging_gate::{GateDecision, LogAction, LogState, LoggingGate, format_record};
use crate::status::MonitorSnapshot;
use crate::thresholds::{ThresholdController, ThresholdPair};
use crate::timers::{TimerCommand, TimerId, Timers};

pub(crate) struct Devices {
    pub accel: Box<dyn Accelerometer>,
    pub thermo: Box<dyn Thermometer>,
    pub actuators: Box<dyn Actuators>,
    pub log: Box<dyn LogStore>,
    pub display: Box<dyn Display>,
    pub temperature_knob: Box<dyn AnalogInput>,
    pub vibration_knob: Box<dyn AnalogInput>,
}

pub struct Monitor {
    dev: Devices,
    timing: TimingCfg,
    tone: ToneCfg,
    timers: Timers,
    estimator: DualSampleVibrationEstimator,
    alarms: ThresholdAlarmEngine,
    gate: LoggingGate,
    thresholds: ThresholdController,
    rotor: DisplayRotor,
    tone_plan: Option<TonePlan>,
    temperature: f32,
    knobs: (f32, f32),
    started: bool,
    cycles: u64,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("phase", &self.estimator.phase())
            .field("alarms", &self.alarms)
            .field("gate", &self.gate)
            .field("thresholds", &self.thresholds.current())
            .field("choice", &self.rotor.choice())
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl Monitor {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    pub(crate) fn from_parts(
        dev: Devices,
        timing: TimingCfg,
        thresholds: ThresholdController,
        tone: ToneCfg,
        rotor: DisplayRotor,
    ) -> Self {
        let estimator = DualSampleVibrationEstimator::new(timing.debounce, timing.second_read_delay);
        Self {
            dev,
            timing,
            tone,
            timers: Timers::new(),
            estimator,
            alarms: ThresholdAlarmEngine::new(),
            gate: LoggingGate::new(),
            thresholds,
            rotor,
            tone_plan: None,
            temperature: 0.0,
            knobs: (0.0, 0.0),
            started: false,
            cycles: 0,
        }
    }

    // ── Bring-up helpers ─────────────────────────────────────────────────────

    pub fn show_message(&mut self, text: &str) {
        tracing::info!(message = text, "display message");
        self.dev.display.show_message(text);
    }

    /// One attempt at opening the persistent log.
    pub fn open_storage(&mut self) -> Result<(), MonitorError> {
        self.dev.log.open().map_err(|e| map_hw_error(&*e))
    }

    pub fn probe_accelerometer(&mut self) -> bool {
        self.dev.accel.probe()
    }

    pub fn set_status_led(&mut self, led: StatusLed, on: bool) {
        self.dev.actuators.set_status_led(led, on);
    }

    // ── Event handlers ───────────────────────────────────────────────────────

    /// Begin monitoring at `now`: startup colour, floor LED, first thresholds
    /// and the sample-start ticker.
    pub fn start(&mut self, now: Duration) {
        if self.started {
            tracing::debug!("monitor already started");
            return;
        }
        self.started = true;
        self.dev.actuators.set_indicator(Rgb::STARTUP);
        self.dev
            .actuators
            .set_status_led(StatusLed::FloorActive, self.thresholds.floor_raised());
        self.refresh_thresholds();
        self.refresh_temperature();
        self.timers.apply(
            now,
            TimerCommand::every(TimerId::SampleStart, self.timing.sample_period),
        );
        tracing::info!(
            sample_period = ?self.timing.sample_period,
            floor = self.thresholds.floor(),
            "monitor started"
        );
    }

    /// Dispatch every timer due at or before `now`, in deadline order.
    /// Returns how many fired.
    ///
    /// Handlers run at `now`, not at the missed deadline: a late sample read
    /// happens at the dispatch time and follow-up delays count from there.
    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some((timer, due)) = self.timers.pop_due(now) {
            if now > due {
                tracing::trace!(?timer, late = ?(now - due), "late timer");
            }
            self.on_timer(timer, now);
            fired += 1;
        }
        fired
    }

    pub fn on_timer(&mut self, timer: TimerId, at: Duration) {
        match timer {
            TimerId::SampleStart => {
                if let Some(cmd) = self.estimator.begin_cycle(at, self.dev.accel.as_mut()) {
                    self.timers.apply(at, cmd);
                }
            }
            TimerId::SampleEnd => {
                if let Some(sample) = self.estimator.complete_cycle(at, self.dev.accel.as_mut()) {
                    self.on_sample_complete(at, sample);
                }
            }
            TimerId::VibrationVisual => self.dev.actuators.set_indicator(Rgb::VIBRATION),
            TimerId::TemperatureEffect => {
                self.dev.actuators.set_indicator(Rgb::TEMPERATURE);
                if let Some(plan) = self.tone_plan {
                    self.dev.actuators.set_audio_period(plan.period_s);
                    self.dev.actuators.set_audio_duty(plan.duty);
                }
            }
            TimerId::DigitalPin => {
                self.dev.actuators.set_digital_output(true);
                tracing::debug!("alarm output asserted");
            }
        }
    }

    /// Logging decision first, then alarm evaluation, for one finished cycle.
    pub fn on_sample_complete(&mut self, at: Duration, sample: VibrationSample) {
        self.cycles = self.cycles.saturating_add(1);

        if self.gate.on_sample(&sample, self.thresholds.floor()) == GateDecision::Persist {
            self.timers.detach(TimerId::SampleStart);
            tracing::debug!(total = sample.total, "significant sample; sampling suspended");
        }

        if self.alarms.watching_temperature() {
            self.refresh_temperature();
        }
        let thr = self.thresholds.current();
        let transition =
            self.alarms
                .evaluate(sample.total, self.temperature, thr.vibration, thr.temperature);
        if transition == AlarmTransition::TemperatureTriggered {
            let activation = self.alarms.activation_vibration().unwrap_or(0.0);
            let plan = TonePlan::for_activation(activation, &self.tone);
            if plan.clamped {
                tracing::warn!(
                    activation,
                    min_activation = self.tone.min_activation,
                    "activation vibration below minimum; tone period clamped"
                );
            }
            self.tone_plan = Some(plan);
        }
        for cmd in transition.timer_commands(&self.timing) {
            self.timers.apply(at, cmd);
        }
    }

    /// The polling step: thresholds, log close or write, temperature, display.
    pub fn control_tick(&mut self, now: Duration) {
        self.refresh_thresholds();

        match self.gate.next_action() {
            LogAction::None => {}
            LogAction::Close { resume_sampling } => {
                if let Err(e) = self.dev.log.close() {
                    let err = map_hw_error(&*e);
                    tracing::error!(error = %err, "log close failed");
                }
                self.dev.actuators.set_status_led(StatusLed::LogClosed, true);
                tracing::info!(records = self.gate.records_written(), "log closed");
                if resume_sampling {
                    self.resume_sampling(now);
                }
            }
            LogAction::Write => {
                let activation = self.alarms.take_new_activation();
                let record = format_record(&self.estimator.sample(), activation);
                match self.dev.log.append_record(&record) {
                    Ok(()) => {
                        self.gate.record_written();
                        tracing::debug!(activation, "log record written");
                    }
                    Err(e) => {
                        self.gate.record_failed();
                        let err = map_hw_error(&*e);
                        tracing::error!(error = %err, "log write failed");
                    }
                }
                self.resume_sampling(now);
            }
        }

        self.refresh_temperature();
        let frame = self.frame();
        self.dev.display.render(&frame);
    }

    pub fn on_edge(&mut self, edge: InputEdge) {
        tracing::debug!(?edge, "input edge");
        match edge {
            InputEdge::RotateDisplay => {
                self.rotor.rotate();
            }
            InputEdge::CloseLog => self.gate.request_close(),
            InputEdge::ToggleFloor => {
                let raised = self.thresholds.toggle_floor();
                self.dev
                    .actuators
                    .set_status_led(StatusLed::FloorActive, raised);
            }
        }
    }

    /// Close the log if it is still open. Used when the process exits.
    pub fn shutdown(&mut self) {
        if self.gate.state() == LogState::Open
            && let Err(e) = self.dev.log.close()
        {
            let err = map_hw_error(&*e);
            tracing::warn!(error = %err, "log close on shutdown failed");
        }
        self.timers = Timers::new();
    }

    fn resume_sampling(&mut self, now: Duration) {
        self.timers.apply(
            now,
            TimerCommand::every(TimerId::SampleStart, self.timing.resume_period),
        );
    }

    fn refresh_thresholds(&mut self) -> ThresholdPair {
        let temp_in = self.dev.temperature_knob.read_normalized();
        let vib_in = self.dev.vibration_knob.read_normalized();
        self.knobs = (temp_in, vib_in);
        self.thresholds.compute(temp_in, vib_in)
    }

    fn refresh_temperature(&mut self) {
        match self.dev.thermo.read_celsius() {
            Ok(c) if c.is_finite() => self.temperature = c,
            Ok(c) => tracing::warn!(celsius = c, "non-finite temperature ignored"),
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "temperature read failed; keeping last value");
            }
        }
    }

    fn frame(&self) -> DisplayFrame {
        let thr = self.thresholds.current();
        let sample = self.estimator.sample();
        DisplayFrame {
            choice: self.rotor.choice(),
            vibration_threshold: thr.vibration,
            temperature_threshold: thr.temperature,
            min_floor: self.thresholds.floor(),
            total_vibration: sample.total,
            axes: sample.axes(),
            temperature: self.temperature,
            temperature_input: self.knobs.0,
            vibration_input: self.knobs.1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn alarms(&self) -> &ThresholdAlarmEngine {
        &self.alarms
    }

    pub fn gate(&self) -> &LoggingGate {
        &self.gate
    }

    pub fn thresholds(&self) -> ThresholdPair {
        self.thresholds.current()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn failed_reads(&self) -> u64 {
        self.estimator.failed_reads()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            phase: self.estimator.phase(),
            vibration_alarm: self.alarms.latch(AlarmKind::Vibration),
            temperature_alarm: self.alarms.latch(AlarmKind::Temperature),
            activation_vibration: self.alarms.activation_vibration(),
            thresholds: self.thresholds.current(),
            min_floor: self.thresholds.floor(),
            sample: self.estimator.sample(),
            temperature: self.temperature,
            log_state: self.gate.state(),
            write_pending: self.gate.write_pending(),
            sample_period: self.timers.period(TimerId::SampleStart),
            display_choice: self.rotor.choice(),
            cycles: self.cycles,
            records_written: self.gate.records_written(),
        }
    }
}
