//! Error types for the keyboard core

use thiserror::Error;

/// Failure reported by a sensor driver.
///
/// Distinct from "not ready": a fault means the read itself went wrong
/// (bus error, timeout, device gone).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct SensorFault(pub String);

impl SensorFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Failure driving the shared reset line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ResetFault(pub String);

impl ResetFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised by the keyboard
#[derive(Debug, Error)]
pub enum KeyboardError {
    /// The reset line could not be driven. Fatal during bring-up.
    #[error("unable to drive the reset line: {0}")]
    ResetLine(#[from] ResetFault),

    /// A sensor could not be brought up. Fatal during bring-up.
    #[error("sensor {channel} failed to initialise: {source}")]
    SensorInit {
        channel: usize,
        #[source]
        source: SensorFault,
    },

    /// A sensor read failed mid-pass.
    #[error("sensor {channel} read failed: {source}")]
    SensorRead {
        channel: usize,
        #[source]
        source: SensorFault,
    },

    #[error("channel {channel} out of range (keyboard has {channels})")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("a keyboard needs at least one channel")]
    NoChannels,
}

pub type Result<T> = std::result::Result<T, KeyboardError>;
