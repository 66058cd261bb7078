//! Device assembly, the monitored run, self-check and summary output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use vibewatch_config::Config;
use vibewatch_core::hw_error::map_hw_error;
use vibewatch_core::{Monitor, MonitorError, RunSummary, Runner, TimingCfg};
use vibewatch_hardware::{
    ConsoleActuators, FileLogStore, SharedKnob, SimProfile, SimulatedAccelerometer,
    SimulatedThermometer, TraceAccelerometer,
};
use vibewatch_traits::clock::MonotonicClock;
use vibewatch_traits::{Accelerometer, Actuators, Thermometer};
use vibewatch_ui::TerminalDisplay;

use crate::console::{self, ConsoleInputs};

/// Edges buffered between runner passes; a burst beyond this is dropped or waits.
const EDGE_QUEUE: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub duration: Option<Duration>,
    pub trace: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub simulate: bool,
}

pub fn sim_profile(s: &vibewatch_config::Simulation) -> SimProfile {
    SimProfile {
        seed: s.seed,
        noise_g: s.noise_g,
        burst_every: Duration::from_millis(s.burst_every_ms),
        burst_len: Duration::from_millis(s.burst_len_ms),
        burst_g: s.burst_g,
        ambient_c: s.ambient_c,
        heating_c_per_s: s.heating_c_per_s,
    }
}

struct Knobs {
    temperature: SharedKnob,
    vibration: SharedKnob,
}

fn build_monitor(
    cfg: &Config,
    accel: impl Accelerometer + 'static,
    thermo: impl Thermometer + 'static,
    actuators: impl Actuators + 'static,
    store: FileLogStore,
    knobs: &Knobs,
) -> eyre::Result<Monitor> {
    Monitor::builder()
        .with_sensors(accel, thermo)
        .with_actuators(actuators)
        .with_log_store(store)
        .with_display(TerminalDisplay::new(std::io::stdout()))
        .with_inputs(knobs.temperature.clone(), knobs.vibration.clone())
        .with_timing(TimingCfg::from(cfg))
        .with_thresholds((&cfg.thresholds).into())
        .with_tone((&cfg.tone).into())
        .with_initial_panel(cfg.display.initial_panel)
        .build()
}

fn assemble_sim(
    cfg: &Config,
    opts: &RunOptions,
    clock: MonotonicClock,
    store: FileLogStore,
    knobs: &Knobs,
) -> eyre::Result<Monitor> {
    let profile = sim_profile(&cfg.simulation);
    let thermo = SimulatedThermometer::new(&profile, clock);
    let actuators = ConsoleActuators::new();
    match &opts.trace {
        Some(path) => {
            let rows = vibewatch_config::load_trace_csv(path)?;
            tracing::info!(path = %path.display(), rows = rows.len(), "replaying accelerometer trace");
            let accel = TraceAccelerometer::new(rows.iter().map(|r| r.axes()).collect());
            build_monitor(cfg, accel, thermo, actuators, store, knobs)
        }
        None => {
            let accel = SimulatedAccelerometer::new(profile, clock);
            build_monitor(cfg, accel, thermo, actuators, store, knobs)
        }
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn assemble_board(
    cfg: &Config,
    store: FileLogStore,
    knobs: &Knobs,
    edges: crossbeam_channel::Sender<vibewatch_traits::InputEdge>,
) -> eyre::Result<(Monitor, vibewatch_hardware::GpioButtons)> {
    use vibewatch_hardware::{ActuatorPins, ButtonPins, GpioActuators, GpioButtons, Lm75b, Mma7660};

    let b = &cfg.board;
    let accel = Mma7660::new(b.i2c_bus).wrap_err("open MMA7660 accelerometer")?;
    let thermo = Lm75b::new(b.i2c_bus).wrap_err("open LM75B thermometer")?;
    let actuators = GpioActuators::new(&ActuatorPins {
        red: b.red_pin,
        green: b.green_pin,
        blue: b.blue_pin,
        speaker: b.speaker_pin,
        alarm_output: b.alarm_output_pin,
        log_closed_led: b.log_closed_led_pin,
        ready_led: b.ready_led_pin,
        floor_led: b.floor_led_pin,
    })
    .wrap_err("open actuator pins")?;
    let buttons = GpioButtons::new(
        &ButtonPins {
            rotate_display: b.rotate_button_pin,
            close_log: b.close_button_pin,
            toggle_floor: b.floor_button_pin,
        },
        move |edge| {
            // Never block the interrupt thread.
            if edges.try_send(edge).is_err() {
                tracing::debug!(?edge, "button edge dropped");
            }
        },
    )
    .wrap_err("arm button interrupts")?;
    let monitor = build_monitor(cfg, accel, thermo, actuators, store, knobs)?;
    Ok((monitor, buttons))
}

/// Assemble devices for `cfg` and run the monitor on the wall clock.
pub fn run_monitor(
    cfg: &Config,
    opts: &RunOptions,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let clock = MonotonicClock::new();
    let log_path = opts
        .log_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.storage.path));
    let store = FileLogStore::new(&log_path);
    let knobs = Knobs {
        temperature: SharedKnob::new(cfg.inputs.temperature_knob),
        vibration: SharedKnob::new(cfg.inputs.vibration_knob),
    };
    let (edges_tx, edges_rx) = crossbeam_channel::bounded(EDGE_QUEUE);

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let (monitor, _buttons) = if opts.simulate {
        (assemble_sim(cfg, opts, clock, store, &knobs)?, None)
    } else {
        let (monitor, buttons) = assemble_board(cfg, store, &knobs, edges_tx.clone())?;
        (monitor, Some(buttons))
    };
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let monitor = {
        if !opts.simulate {
            tracing::debug!("built without hardware support; using simulated devices");
        }
        assemble_sim(cfg, opts, clock, store, &knobs)?
    };

    console::spawn(ConsoleInputs {
        edges: edges_tx,
        temperature_knob: knobs.temperature.clone(),
        vibration_knob: knobs.vibration.clone(),
        shutdown: shutdown.clone(),
    })
    .wrap_err("spawn console input thread")?;

    let mut runner = Runner::new(monitor, clock)
        .with_edges(edges_rx)
        .with_shutdown(shutdown);
    if let Some(limit) = opts.duration {
        runner = runner.with_max_runtime(limit);
    }
    tracing::info!(
        log = %log_path.display(),
        duration_ms = opts.duration.map(|d| d.as_millis() as u64),
        "monitor starting"
    );
    runner.run()
}

pub fn summary_json(summary: &RunSummary) -> serde_json::Value {
    serde_json::json!({
        "elapsed_ms": summary.elapsed.as_millis() as u64,
        "storage_attempts": summary.startup.storage_attempts,
        "accelerometer_connected": summary.startup.accelerometer_connected,
        "cycles": summary.cycles,
        "control_ticks": summary.control_ticks,
        "records_written": summary.records_written,
        "write_failures": summary.write_failures,
        "failed_reads": summary.failed_reads,
        "vibration_alarm": summary.vibration_alarm,
        "temperature_alarm": summary.temperature_alarm,
        "activation_vibration": summary.activation_vibration,
        "log_closed": summary.log_closed,
    })
}

pub fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        println!("{}", summary_json(summary));
        return;
    }
    let alarm = |on: bool| if on { "TRIGGERED" } else { "idle" };
    println!("Run finished after {:.1} s", summary.elapsed.as_secs_f32());
    println!(
        "Cycles: {}  Control ticks: {}",
        summary.cycles, summary.control_ticks
    );
    println!(
        "Records written: {} (failed writes: {}, failed reads: {})",
        summary.records_written, summary.write_failures, summary.failed_reads
    );
    match summary.activation_vibration {
        Some(g) => println!(
            "Vibration alarm: {} at {g:.2} g",
            alarm(summary.vibration_alarm)
        ),
        None => println!("Vibration alarm: {}", alarm(summary.vibration_alarm)),
    }
    println!("Temperature alarm: {}", alarm(summary.temperature_alarm));
    println!(
        "Log: {}",
        if summary.log_closed { "closed" } else { "open" }
    );
}

fn storage_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// Check that storage can be reached and the sensors answer, without
/// touching the existing log.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let log_path = PathBuf::from(&cfg.storage.path);
    let dir = storage_dir(&log_path);
    if !dir.is_dir() {
        return Err(MonitorError::StorageUnavailable(format!(
            "{} is not a directory",
            dir.display()
        ))
        .into());
    }

    let (accelerometer, celsius) = {
        #[cfg(all(feature = "hardware", target_os = "linux"))]
        {
            let mut accel = vibewatch_hardware::Mma7660::new(cfg.board.i2c_bus)
                .wrap_err("open MMA7660 accelerometer")?;
            let mut thermo = vibewatch_hardware::Lm75b::new(cfg.board.i2c_bus)
                .wrap_err("open LM75B thermometer")?;
            probe(&mut accel, &mut thermo)?
        }
        #[cfg(not(all(feature = "hardware", target_os = "linux")))]
        {
            let clock = MonotonicClock::new();
            let profile = sim_profile(&cfg.simulation);
            let mut thermo = SimulatedThermometer::new(&profile, clock);
            let mut accel = SimulatedAccelerometer::new(profile, clock);
            probe(&mut accel, &mut thermo)?
        }
    };

    tracing::info!(
        storage = %dir.display(),
        accelerometer,
        celsius,
        "self-check complete"
    );
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "storage_dir": dir.display().to_string(),
                "accelerometer_connected": accelerometer,
                "temperature_c": celsius,
            })
        );
    } else {
        println!("Storage: {} (ok)", dir.display());
        println!(
            "Accelerometer: {}",
            if accelerometer { "connected" } else { "not connected" }
        );
        println!("Temperature: {celsius:.1} °C");
        println!("self-check ok");
    }
    Ok(())
}

fn probe(accel: &mut impl Accelerometer, thermo: &mut impl Thermometer) -> eyre::Result<(bool, f32)> {
    let connected = accel.probe() && accel.read_axes().is_ok();
    let celsius = thermo.read_celsius().map_err(|e| map_hw_error(&*e))?;
    Ok((connected, celsius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_profile_carries_config_values() {
        let sim = vibewatch_config::Simulation {
            burst_every_ms: 250,
            burst_len_ms: 50,
            ..Default::default()
        };
        let p = sim_profile(&sim);
        assert_eq!(p.burst_every, Duration::from_millis(250));
        assert_eq!(p.burst_len, Duration::from_millis(50));
        assert_eq!(p.seed, sim.seed);
    }

    #[test]
    fn storage_dir_defaults_to_cwd() {
        assert_eq!(storage_dir(Path::new("Vib.txt")), Path::new("."));
        assert_eq!(storage_dir(Path::new("/mnt/usb/Vib.txt")), Path::new("/mnt/usb"));
    }

    #[test]
    fn summary_json_reports_missing_activation_as_null() {
        let summary = RunSummary {
            startup: vibewatch_core::StartupReport {
                storage_attempts: 1,
                accelerometer_connected: true,
            },
            elapsed: Duration::from_millis(1500),
            cycles: 40,
            control_ticks: 4,
            records_written: 0,
            write_failures: 0,
            failed_reads: 0,
            vibration_alarm: false,
            temperature_alarm: false,
            activation_vibration: None,
            log_closed: false,
        };
        let v = summary_json(&summary);
        assert_eq!(v["elapsed_ms"], 1500);
        assert_eq!(v["cycles"], 40);
        assert!(v["activation_vibration"].is_null());
    }
}
