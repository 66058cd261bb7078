//! Human-readable error descriptions, exit codes and structured JSON errors.

use vibewatch_core::error::{BuildError, MonitorError};
use vibewatch_hardware::error::HwError;

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_STORAGE: i32 = 2;
pub const EXIT_CONFIG: i32 = 3;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensors => {
                "What happened: No accelerometer/thermometer was provided to the monitor.\nLikely causes: Sensor initialization failed or was not wired into the builder.\nHow to fix: Ensure both sensors are created and passed via with_sensors(...).".to_string()
            }
            BuildError::MissingActuators => {
                "What happened: No actuators were provided to the monitor.\nLikely causes: GPIO setup failed or was not wired into the builder.\nHow to fix: Ensure the actuators are created and passed via with_actuators(...).".to_string()
            }
            BuildError::MissingStorage => {
                "What happened: No log storage was provided to the monitor.\nLikely causes: The log store was not wired into the builder.\nHow to fix: Pass a log store via with_log_store(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Inconsistent timing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::StorageUnavailable(msg) => format!(
                "What happened: Log storage could not be opened ({msg}).\nLikely causes: USB stick not mounted, wrong storage.path, or no write permission.\nHow to fix: Mount the storage or point --log-path / storage.path at a writable directory."
            ),
            MonitorError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            MonitorError::Shutdown => {
                "What happened: Interrupted before the monitor started.\nLikely causes: Ctrl-C while waiting for storage.\nHow to fix: Connect the storage first, then start a new run.".to_string()
            }
            MonitorError::Hardware(msg) | MonitorError::HardwareFault(msg) => format!(
                "What happened: A device reported an error ({msg}).\nLikely causes: Loose I2C wiring, wrong bus, or missing power.\nHow to fix: Check board.i2c_bus and the sensor wiring."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::Gpio(msg) => format!(
                "What happened: Failed to initialize GPIO pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [board] pins in the config; ensure the process may access /dev/gpiomem."
            ),
            HwError::I2c(msg) => format!(
                "What happened: I2C sensor did not respond ({msg}).\nLikely causes: Wrong bus number, I2C disabled, or wiring/power issues.\nHow to fix: Enable I2C, check board.i2c_bus and the sensor wiring."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from input files
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'x,y,z'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: storage 2, config 3, interrupted 130, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::StorageUnavailable(_) => EXIT_STORAGE,
            MonitorError::Config(_) => EXIT_CONFIG,
            MonitorError::Shutdown => EXIT_INTERRUPTED,
            _ => EXIT_GENERIC,
        };
    }
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(_)) => return EXIT_CONFIG,
        Some(_) => return EXIT_GENERIC,
        None => {}
    }
    if let Some(HwError::StorageUnavailable(_)) = err.downcast_ref::<HwError>() {
        return EXIT_STORAGE;
    }
    EXIT_GENERIC
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::StorageUnavailable(_) => "StorageUnavailable",
            MonitorError::Config(_) => "Config",
            MonitorError::Shutdown => "Interrupted",
            MonitorError::Hardware(_) | MonitorError::HardwareFault(_) => "Hardware",
            MonitorError::Io(_) => "Io",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
