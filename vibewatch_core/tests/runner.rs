use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vibewatch_core::mocks::{
    MemoryLog, RecordingActuators, RecordingDisplay, ScriptedAccelerometer, SharedLevel,
    SharedThermometer,
};
use vibewatch_core::{Monitor, Runner};
use vibewatch_traits::clock::Clock;
use vibewatch_traits::clock::test_clock::TestClock;
use vibewatch_traits::{Accelerometer, Axes, Display, DisplayFrame, InputEdge};

fn monitor(accel: ScriptedAccelerometer, log: MemoryLog, display: RecordingDisplay) -> Monitor {
    Monitor::builder()
        .with_sensors(accel, SharedThermometer::new(70.0))
        .with_actuators(RecordingActuators::new())
        .with_log_store(log)
        .with_display(display)
        .with_inputs(SharedLevel::new(1.0), SharedLevel::new(1.0))
        .build()
        .expect("monitor builds")
}

#[test]
fn simulated_run_logs_and_latches_both_alarms() {
    let log = MemoryLog::new();
    let display = RecordingDisplay::new();
    let clock = TestClock::new();
    let mut runner = Runner::new(
        monitor(
            ScriptedAccelerometer::from_totals([0.3, 2.5]),
            log.clone(),
            display.clone(),
        ),
        clock.clone(),
    )
    .with_max_runtime(Duration::from_secs(4));

    let summary = runner.run().expect("run completes");

    assert_eq!(summary.startup.storage_attempts, 1);
    assert!(summary.startup.accelerometer_connected);
    assert_eq!(summary.elapsed, Duration::from_secs(3));
    assert_eq!(summary.control_ticks, 6);
    assert_eq!(summary.records_written, 2);
    assert!(summary.vibration_alarm);
    assert!(summary.temperature_alarm);
    assert_eq!(summary.activation_vibration, Some(2.5));
    assert!(!summary.log_closed);

    let records = log.records();
    assert!(records[1].starts_with("Activation Readings:\r\n"));
    // Closed on the way out.
    assert_eq!(log.close_calls(), 1);
    assert_eq!(
        display.messages(),
        vec![
            "Connect storage".to_string(),
            "Storage connected".to_string(),
            "Accelerometer connected".to_string(),
        ]
    );
    assert_eq!(clock.elapsed(), Duration::from_secs(4));
}

#[test]
fn close_edge_is_honoured_on_next_tick() {
    let (tx, rx) = crossbeam_channel::bounded(8);
    let log = MemoryLog::new();
    let mut runner = Runner::new(
        monitor(
            ScriptedAccelerometer::from_totals([0.3]),
            log.clone(),
            RecordingDisplay::new(),
        ),
        TestClock::new(),
    )
    .with_edges(rx)
    .with_max_runtime(Duration::from_secs(2));
    tx.send(InputEdge::CloseLog).unwrap();

    let summary = runner.run().unwrap();
    assert!(summary.log_closed);
    assert_eq!(summary.records_written, 0);
    assert_eq!(log.close_calls(), 1);
}

#[test]
fn missing_accelerometer_is_reported_not_fatal() {
    let display = RecordingDisplay::new();
    let mut runner = Runner::new(
        monitor(
            ScriptedAccelerometer::new([]).disconnected(),
            MemoryLog::new(),
            display.clone(),
        ),
        TestClock::new(),
    )
    .with_max_runtime(Duration::from_millis(1500));
    let summary = runner.run().unwrap();
    assert!(!summary.startup.accelerometer_connected);
    assert!(
        display
            .messages()
            .contains(&"Accelerometer not connected".to_string())
    );
}

/// Display whose refresh blocks the loop for 300 ms of virtual time.
struct SlowDisplay(TestClock);

impl Display for SlowDisplay {
    fn show_message(&mut self, _text: &str) {}

    fn render(&mut self, _frame: &DisplayFrame) {
        self.0.sleep(Duration::from_millis(300));
    }
}

/// Accelerometer that notes the virtual time of every read.
struct StampedAccelerometer {
    clock: TestClock,
    stamps: Rc<RefCell<Vec<Duration>>>,
}

impl Accelerometer for StampedAccelerometer {
    fn read_axes(&mut self) -> Result<Axes, Box<dyn std::error::Error + Send + Sync>> {
        self.stamps.borrow_mut().push(self.clock.elapsed());
        Ok([0.0, 0.0, 1.0])
    }
}

#[test]
fn stalled_loop_does_not_burst_sensor_reads() {
    let clock = TestClock::new();
    let stamps = Rc::new(RefCell::new(Vec::new()));
    let monitor = Monitor::builder()
        .with_sensors(
            StampedAccelerometer {
                clock: clock.clone(),
                stamps: Rc::clone(&stamps),
            },
            SharedThermometer::new(20.0),
        )
        .with_actuators(RecordingActuators::new())
        .with_log_store(MemoryLog::new())
        .with_display(SlowDisplay(clock.clone()))
        .build()
        .expect("monitor builds");
    let mut runner = Runner::new(monitor, clock).with_max_runtime(Duration::from_secs(4));

    let summary = runner.run().expect("run completes");

    let stamps = stamps.borrow();
    assert!(stamps.len() >= 20, "only {} reads", stamps.len());
    for pair in stamps.windows(2) {
        assert!(
            pair[1] - pair[0] >= Duration::from_millis(10),
            "reads at {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
    assert!(summary.cycles > 0);
}
