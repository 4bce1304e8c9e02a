//! Simulated sensor
//!
//! Stands in for a VL53L0X when no hardware is attached. A finger presses
//! the key on a triangle profile, the sensor only has fresh data every few
//! polls, and the occasional reading drops out to a near-zero distance the
//! way the real parts do.

use super::SensorChannel;
use crate::error::SensorFault;
use serde::{Deserialize, Serialize};

/// Settings for a simulated key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedConfig {
    /// Distance with no finger over the key (mm)
    #[serde(default = "default_rest_distance")]
    pub rest_distance: f64,

    /// Distance at full press (mm)
    #[serde(default = "default_pressed_distance")]
    pub pressed_distance: f64,

    /// Polls per press/release cycle
    #[serde(default = "default_period")]
    pub period: u32,

    /// Offset into the cycle, in polls
    #[serde(default)]
    pub phase: u32,

    /// Fresh data once every N polls (1 = always ready)
    #[serde(default = "default_ready_every")]
    pub ready_every: u32,

    /// Every Nth fresh reading is a drop-out (0 = never)
    #[serde(default)]
    pub glitch_every: u32,

    /// Distance reported by a drop-out (mm)
    #[serde(default = "default_glitch_distance")]
    pub glitch_distance: f64,
}

fn default_rest_distance() -> f64 { 300.0 }
fn default_pressed_distance() -> f64 { 20.0 }
fn default_period() -> u32 { 24 }
fn default_ready_every() -> u32 { 1 }
fn default_glitch_distance() -> f64 { 0.0 }

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            rest_distance: default_rest_distance(),
            pressed_distance: default_pressed_distance(),
            period: default_period(),
            phase: 0,
            ready_every: default_ready_every(),
            glitch_every: 0,
            glitch_distance: default_glitch_distance(),
        }
    }
}

impl SimulatedConfig {
    /// Default profile with the cycle offset for the given channel
    pub fn for_channel(channel: usize) -> Self {
        Self {
            phase: (channel as u32).wrapping_mul(3),
            ..Self::default()
        }
    }
}

/// Deterministic simulated sensor
pub struct SimulatedSensor {
    config: SimulatedConfig,
    polls: u64,
    readings: u64,
}

impl SimulatedSensor {
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            config,
            polls: 0,
            readings: 0,
        }
    }

    /// Distance on the press profile at the current poll
    fn profile_distance(&self) -> f64 {
        let period = self.config.period.max(2) as u64;
        let t = (self.polls + self.config.phase as u64) % period;
        let half = period as f64 / 2.0;
        let depth = if (t as f64) < half {
            t as f64 / half
        } else {
            (period - t) as f64 / half
        };
        let travel = self.config.rest_distance - self.config.pressed_distance;
        (self.config.rest_distance - depth * travel).round()
    }
}

impl SensorChannel for SimulatedSensor {
    fn is_ready(&mut self) -> Result<bool, SensorFault> {
        self.polls += 1;
        let every = self.config.ready_every.max(1) as u64;
        Ok(self.polls % every == 0)
    }

    fn raw_distance(&mut self) -> Result<f64, SensorFault> {
        self.readings += 1;
        let glitch_every = self.config.glitch_every as u64;
        if glitch_every > 0 && self.readings % glitch_every == 0 {
            return Ok(self.config.glitch_distance);
        }
        Ok(self.profile_distance())
    }
}
