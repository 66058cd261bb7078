//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();
/// Set by the Ctrl-C handler; a run stopped this way exits with 130.
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "vibewatch", version, about = "Vibration and temperature alarm monitor")]
pub struct Cli {
    /// Path to config TOML (typed); a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/vibewatch.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor until Ctrl-C, `q` on stdin, or the duration limit
    Run {
        /// Stop after this many milliseconds (bring-up included)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Replay accelerometer readings from a CSV with headers x,y,z
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Override storage.path from the config
        #[arg(long, value_name = "FILE")]
        log_path: Option<PathBuf>,
        /// Use simulated devices even when built with hardware support
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Quick health check (storage location, sensors answer)
    SelfCheck,
}
