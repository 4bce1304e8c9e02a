//! tofkeys - key-press depth from a bank of time-of-flight sensors
//!
//! Each key is a distance sensor. Readings are scaled into 0..1 against
//! bounds the keyboard discovers on its own, drop-outs are filtered, and
//! sensors with nothing new repeat their last level, so an audio loop can
//! poll every key at a steady rate.

pub mod calibration;
pub mod config;
pub mod driver;
pub mod error;
pub mod keyboard;
pub mod mapping;
pub mod sensors;
pub mod telemetry;
pub mod viz;

pub use config::TofkeysConfig;
pub use driver::Driver;
pub use error::{KeyboardError, ResetFault, SensorFault};
pub use keyboard::{Keyboard, KeyboardSettings, Levels};
