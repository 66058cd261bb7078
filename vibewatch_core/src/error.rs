use thiserror::Error;

/// Failures the monitor and runner report upward.
///
/// Sensor and write failures inside the loop are logged and absorbed; only
/// bring-up and shutdown conditions surface as errors.
#[derive(Debug, Error, Clone)]
pub enum MonitorError {
    /// Device error without a more specific type.
    #[error("hardware error: {0}")]
    Hardware(String),
    /// Typed `HwError` from the board drivers.
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
    /// Shutdown was requested before the monitor started.
    #[error("shutdown requested")]
    Shutdown,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("monitor needs an accelerometer and a thermometer")]
    MissingSensors,
    #[error("monitor needs actuators")]
    MissingActuators,
    #[error("monitor needs a log store")]
    MissingStorage,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
