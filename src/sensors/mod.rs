//! Sensors for the keyboard
//!
//! Each key is one time-of-flight sensor on its own multiplexer channel.
//! Hardware drivers live outside this crate and plug in through
//! [`SensorChannel`]; the scripted and simulated sensors here cover tests
//! and running without hardware.

mod channel;
mod scripted;
mod simulated;

pub use channel::{RawReading, SensorChannel};
pub use scripted::{ScriptHandle, ScriptStep, ScriptedSensor};
pub use simulated::{SimulatedConfig, SimulatedSensor};
