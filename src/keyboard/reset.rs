//! Multiplexer reset sequencing
//!
//! The multiplexer latches a reset on a short low pulse of its RST pin and
//! needs time to settle before the sensors behind it are touched.

use crate::error::{KeyboardError, ResetFault};
use std::time::Duration;
use tracing::info;

/// A digital output wired to the reset pin (active low)
pub trait ResetLine {
    fn set_low(&mut self) -> Result<(), ResetFault>;
    fn set_high(&mut self) -> Result<(), ResetFault>;
}

/// Blocking delay source
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Reset line for running without hardware; remembers its level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedResetLine {
    high: bool,
}

impl DetachedResetLine {
    pub fn new() -> Self {
        Self { high: true }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl Default for DetachedResetLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetLine for DetachedResetLine {
    fn set_low(&mut self) -> Result<(), ResetFault> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ResetFault> {
        self.high = true;
        Ok(())
    }
}

/// Drives one reset pulse followed by a settle wait
pub struct ResetSequencer<L, D = ThreadDelay> {
    line: L,
    delay: D,
    pulse: Duration,
    settle: Duration,
}

impl<L: ResetLine> ResetSequencer<L, ThreadDelay> {
    /// Create a sequencer using thread sleeps for timing
    pub fn new(line: L) -> Self {
        Self::with_delay(line, ThreadDelay)
    }
}

impl<L: ResetLine, D: Delay> ResetSequencer<L, D> {
    /// Create a sequencer with a custom delay source
    pub fn with_delay(line: L, delay: D) -> Self {
        Self {
            line,
            delay,
            pulse: Duration::from_millis(1),
            settle: Duration::from_millis(100),
        }
    }

    /// Set how long the line is held low
    pub fn with_pulse(mut self, pulse: Duration) -> Self {
        self.pulse = pulse;
        self
    }

    /// Set the wait after releasing the line
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn pulse(&self) -> Duration {
        self.pulse
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Pulse the line low, release it, and wait for the hardware to settle
    pub fn reset(&mut self) -> Result<(), KeyboardError> {
        info!(pulse = ?self.pulse, settle = ?self.settle, "resetting multiplexer");
        self.line.set_low()?;
        self.delay.delay(self.pulse);
        self.line.set_high()?;
        self.delay.delay(self.settle);
        Ok(())
    }

    /// Give back the line and delay
    pub fn into_parts(self) -> (L, D) {
        (self.line, self.delay)
    }
}
