//! Per-channel calibration
//!
//! Raw distances are scaled into 0..1 against self-discovered bounds, then
//! screened for sensor drop-outs before they reach the level cache.

mod cache;
mod glitch;
mod range;

pub use cache::LevelCache;
pub use glitch::{GlitchFilter, GlitchReference, Verdict};
pub use range::{round_to, CalibrationBounds, CalibrationPhase, RangeCalibrator};
