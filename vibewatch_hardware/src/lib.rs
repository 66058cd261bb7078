//! Device implementations of the `vibewatch_traits` capabilities.
//!
//! The simulated devices and the file log build everywhere. The board drivers
//! (MMA7660 accelerometer, LM75B thermometer, GPIO outputs and buttons) need
//! the `hardware` feature and a Linux target.

pub mod error;
pub mod sim;
pub mod storage;

#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod lm75b;
#[cfg(feature = "hardware")]
pub mod mma7660;

pub use sim::{
    ConsoleActuators, SharedKnob, SimProfile, SimulatedAccelerometer, SimulatedThermometer,
    TraceAccelerometer,
};
pub use storage::FileLogStore;

#[cfg(feature = "hardware")]
pub use gpio::{ActuatorPins, ButtonPins, GpioActuators, GpioButtons};
#[cfg(feature = "hardware")]
pub use lm75b::Lm75b;
#[cfg(feature = "hardware")]
pub use mma7660::Mma7660;
