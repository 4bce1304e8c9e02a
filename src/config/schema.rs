//! Configuration schema definitions

use crate::calibration::{CalibrationBounds, GlitchReference};
use crate::keyboard::KeyboardSettings;
use crate::mapping::{DepthVolumeMapper, KeyAssignment, MappingPipeline, PressDetector};
use crate::sensors::SimulatedConfig;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for tofkeys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TofkeysConfig {
    /// Calibration and filtering
    #[serde(default)]
    pub keyboard: KeyboardConfig,

    /// Multiplexer reset timing
    #[serde(default)]
    pub reset: ResetConfig,

    /// Polling rate
    #[serde(default)]
    pub poll: PollConfig,

    /// Level to volume mapping
    #[serde(default)]
    pub volume: VolumeConfig,

    /// Press detection for note selection
    #[serde(default)]
    pub press: PressConfig,

    /// Notes per key, in channel order
    #[serde(default)]
    pub keys: Vec<KeyAssignment>,

    /// Simulated sensors, in channel order; missing channels use defaults
    #[serde(default)]
    pub simulation: Vec<SimulatedConfig>,
}

impl TofkeysConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let kb = &self.keyboard;
        if kb.channels == 0 || kb.channels > 64 {
            bail!("Channel count must be between 1 and 64");
        }
        if kb.precision > 10 {
            bail!("Precision must be at most 10 decimal places");
        }
        if !(0.0..=1.0).contains(&kb.glitch_ratio) {
            bail!("Glitch ratio must be between 0.0 and 1.0");
        }
        if !kb.sentinel_min.is_finite() || !kb.sentinel_max.is_finite() {
            bail!("Sentinel bounds must be finite");
        }

        if self.reset.pulse_us == 0 {
            bail!("Reset pulse must be at least 1 us");
        }

        if self.volume.max_depth <= 0.0 || self.volume.max_depth > 1.0 {
            bail!("Volume max_depth must be in (0.0, 1.0]");
        }
        if self.volume.scale < 0.0 {
            bail!("Volume scale must not be negative");
        }

        if !(0.0..=1.0).contains(&self.press.threshold) {
            bail!("Press threshold must be between 0.0 and 1.0");
        }

        if self.keys.len() > kb.channels {
            bail!(
                "{} key assignments for {} channels",
                self.keys.len(),
                kb.channels
            );
        }
        if let Some(index) = self.keys.iter().position(|k| k.notes().is_empty()) {
            bail!("Key {} has an empty chord", index);
        }
        if self.simulation.len() > kb.channels {
            bail!(
                "{} simulated sensors for {} channels",
                self.simulation.len(),
                kb.channels
            );
        }

        Ok(())
    }

    /// Simulation settings for a channel
    pub fn simulated(&self, channel: usize) -> SimulatedConfig {
        self.simulation
            .get(channel)
            .cloned()
            .unwrap_or_else(|| SimulatedConfig::for_channel(channel))
    }
}

/// Keyboard calibration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// Number of keys (default: 8, one per multiplexer port)
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Starting minimum; above any real reading (default: 8190)
    #[serde(default = "default_sentinel_min")]
    pub sentinel_min: f64,

    /// Starting maximum; below any real reading (default: 0)
    #[serde(default)]
    pub sentinel_max: f64,

    /// Decimal places kept in each level (default: 2)
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// Drop-out threshold as a fraction of the reference (default: 0.1)
    #[serde(default = "default_glitch_ratio")]
    pub glitch_ratio: f64,

    /// What drop-outs are compared against (default: cached)
    #[serde(default)]
    pub glitch_reference: GlitchReference,

    /// Unchanged readings before a channel counts as stable (default: 50)
    #[serde(default = "default_stable_after")]
    pub stable_after: u64,
}

fn default_channels() -> usize { 8 }
fn default_sentinel_min() -> f64 { 8190.0 }
fn default_precision() -> u32 { 2 }
fn default_glitch_ratio() -> f64 { 0.1 }
fn default_stable_after() -> u64 { 50 }

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sentinel_min: default_sentinel_min(),
            sentinel_max: 0.0,
            precision: default_precision(),
            glitch_ratio: default_glitch_ratio(),
            glitch_reference: GlitchReference::default(),
            stable_after: default_stable_after(),
        }
    }
}

impl KeyboardConfig {
    pub fn settings(&self) -> KeyboardSettings {
        KeyboardSettings {
            sentinel: CalibrationBounds::new(self.sentinel_min, self.sentinel_max),
            precision: self.precision,
            glitch_ratio: self.glitch_ratio,
            glitch_reference: self.glitch_reference,
            stable_after: self.stable_after,
        }
    }
}

/// Reset line timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Low pulse length in microseconds (default: 1000)
    #[serde(default = "default_pulse_us")]
    pub pulse_us: u64,

    /// Wait after releasing the line in milliseconds (default: 100)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_pulse_us() -> u64 { 1000 }
fn default_settle_ms() -> u64 { 100 }

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            pulse_us: default_pulse_us(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl ResetConfig {
    pub fn pulse(&self) -> Duration {
        Duration::from_micros(self.pulse_us)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Pause between passes in milliseconds (default: 200)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 { 200 }

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Level to volume mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Portion of the travel that controls volume (default: 0.1)
    #[serde(default = "default_max_depth")]
    pub max_depth: f64,

    /// Output multiplier (default: 1.0)
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_max_depth() -> f64 { 0.1 }
fn default_scale() -> f64 { 1.0 }

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            scale: default_scale(),
        }
    }
}

impl VolumeConfig {
    pub fn pipeline(&self) -> MappingPipeline {
        MappingPipeline::new()
            .with(DepthVolumeMapper::new(self.max_depth).with_scale(self.scale))
    }
}

/// Press detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressConfig {
    /// Levels below this count as pressed (default: 0.1)
    #[serde(default = "default_press_threshold")]
    pub threshold: f64,
}

fn default_press_threshold() -> f64 { 0.1 }

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            threshold: default_press_threshold(),
        }
    }
}

impl PressConfig {
    pub fn detector(&self) -> PressDetector {
        PressDetector::new(self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: TofkeysConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.keyboard.channels, 8);
        assert_eq!(config.keyboard.sentinel_min, 8190.0);
        assert_eq!(config.keyboard.glitch_reference, GlitchReference::Cached);
        assert_eq!(config.reset.pulse(), Duration::from_millis(1));
        assert_eq!(config.poll.interval(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keyboard_section() {
        let yaml = r#"
channels: 3
sentinel_min: 1000
glitch_reference: pass_slot
"#;
        let config: KeyboardConfig = serde_yaml::from_str(yaml).unwrap();
        let settings = config.settings();
        assert_eq!(settings.sentinel, CalibrationBounds::new(1000.0, 0.0));
        assert_eq!(settings.glitch_reference, GlitchReference::PassSlot);
        assert_eq!(settings.precision, 2);
    }

    #[test]
    fn test_too_many_keys_rejected() {
        let mut config = TofkeysConfig::default();
        config.keyboard.channels = 1;
        config.keys = vec![KeyAssignment::Single(60), KeyAssignment::Single(62)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_chord_rejected() {
        let mut config = TofkeysConfig::default();
        config.keys = vec![KeyAssignment::Chord(vec![])];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut config = TofkeysConfig::default();
        config.keyboard.glitch_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = TofkeysConfig::default();
        config.keyboard.channels = 0;
        assert!(config.validate().is_err());

        let mut config = TofkeysConfig::default();
        config.volume.max_depth = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulated_falls_back_per_channel() {
        let mut config = TofkeysConfig::default();
        config.simulation = vec![SimulatedConfig {
            period: 10,
            ..SimulatedConfig::default()
        }];
        assert_eq!(config.simulated(0).period, 10);
        assert_eq!(config.simulated(1), SimulatedConfig::for_channel(1));
    }
}
