//! Line commands on stdin standing in for the push buttons and knobs.
//!
//! `r` rotates the display, `c` closes the log, `f` toggles the vibration
//! floor, `t <0..1>` / `v <0..1>` move the temperature / vibration knob and
//! `q` stops the run.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use vibewatch_hardware::SharedKnob;
use vibewatch_traits::InputEdge;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Edge(InputEdge),
    TemperatureKnob(f32),
    VibrationKnob(f32),
    Quit,
}

pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let level = parts.next().and_then(|v| v.parse::<f32>().ok());
    if parts.next().is_some() {
        return None;
    }
    match (head, level) {
        ("r", None) => Some(ConsoleCommand::Edge(InputEdge::RotateDisplay)),
        ("c", None) => Some(ConsoleCommand::Edge(InputEdge::CloseLog)),
        ("f", None) => Some(ConsoleCommand::Edge(InputEdge::ToggleFloor)),
        ("q", None) => Some(ConsoleCommand::Quit),
        ("t", Some(v)) if v.is_finite() => Some(ConsoleCommand::TemperatureKnob(v)),
        ("v", Some(v)) if v.is_finite() => Some(ConsoleCommand::VibrationKnob(v)),
        _ => None,
    }
}

pub struct ConsoleInputs {
    pub edges: Sender<InputEdge>,
    pub temperature_knob: SharedKnob,
    pub vibration_knob: SharedKnob,
    pub shutdown: Arc<AtomicBool>,
}

/// Read stdin on a detached thread until EOF, quit, or the runner goes away.
pub fn spawn(inputs: ConsoleInputs) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            pump(std::io::stdin().lock(), &inputs);
            tracing::debug!("console input closed");
        })
}

/// Apply commands from `reader` line by line. Lines that are not UTF-8 are
/// skipped; only a read error, EOF, `q` or a dropped receiver stop the loop.
pub fn pump(reader: impl BufRead, inputs: &ConsoleInputs) {
    for bytes in reader.split(b'\n') {
        let bytes = match bytes {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "console read failed");
                break;
            }
        };
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "console line is not UTF-8; ignored");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(ConsoleCommand::Edge(edge)) => {
                if inputs.edges.send(edge).is_err() {
                    break;
                }
            }
            Some(ConsoleCommand::TemperatureKnob(v)) => inputs.temperature_knob.set(v),
            Some(ConsoleCommand::VibrationKnob(v)) => inputs.vibration_knob.set(v),
            Some(ConsoleCommand::Quit) => {
                inputs.shutdown.store(true, Ordering::Relaxed);
                break;
            }
            None => tracing::warn!(line = %line.trim(), "unknown console command"),
        }
    }
}
