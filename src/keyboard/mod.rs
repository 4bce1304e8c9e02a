//! The keyboard: a bank of distance sensors read as key-press depths
//!
//! Each poll walks every channel in index order. Fresh readings are scaled
//! against that channel's self-discovered bounds and screened for
//! drop-outs; channels with nothing new repeat their last accepted level.

mod report;
mod reset;

pub use report::{ChannelRange, RangeReport};
pub use reset::{Delay, DetachedResetLine, ResetLine, ResetSequencer, ThreadDelay};

use crate::calibration::{
    CalibrationBounds, CalibrationPhase, GlitchFilter, GlitchReference, LevelCache,
    RangeCalibrator, Verdict,
};
use crate::error::{KeyboardError, Result, SensorFault};
use crate::sensors::{RawReading, SensorChannel};
use tracing::{debug, info, warn};

/// One level per channel, in channel order
pub type Levels = Vec<f64>;

/// Calibration and filtering settings shared by every channel
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardSettings {
    /// Starting bounds; min should sit above any real reading, max below
    pub sentinel: CalibrationBounds,
    /// Decimal places kept in each level
    pub precision: u32,
    /// Fraction of the reference level below which a reading is a glitch
    pub glitch_ratio: f64,
    pub glitch_reference: GlitchReference,
    /// Unchanged readings before a channel reports itself stable
    pub stable_after: u64,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            // 8190 is the VL53L0X out-of-range code
            sentinel: CalibrationBounds::new(8190.0, 0.0),
            precision: 2,
            glitch_ratio: 0.1,
            glitch_reference: GlitchReference::Cached,
            stable_after: 50,
        }
    }
}

/// Owns the sensors and all per-channel calibration state
pub struct Keyboard {
    sensors: Vec<Box<dyn SensorChannel>>,
    calibrators: Vec<RangeCalibrator>,
    filter: GlitchFilter,
    cache: LevelCache,
    glitches: Vec<u64>,
    /// Verdict on each channel's latest fresh reading
    last_verdict: Vec<Verdict>,
    ticks: u64,
}

impl Keyboard {
    /// Create a keyboard over already initialised sensors
    pub fn new(sensors: Vec<Box<dyn SensorChannel>>, settings: &KeyboardSettings) -> Result<Self> {
        if sensors.is_empty() {
            return Err(KeyboardError::NoChannels);
        }

        let channels = sensors.len();
        let calibrators = (0..channels)
            .map(|channel| {
                RangeCalibrator::new(channel, settings.sentinel)
                    .with_precision(settings.precision)
                    .with_stable_after(settings.stable_after)
            })
            .collect();

        Ok(Self {
            sensors,
            calibrators,
            filter: GlitchFilter::new(settings.glitch_ratio)
                .with_reference(settings.glitch_reference),
            cache: LevelCache::new(channels),
            glitches: vec![0; channels],
            last_verdict: vec![Verdict::Accept; channels],
            ticks: 0,
        })
    }

    /// Reset the multiplexer, then bring up one sensor per channel.
    ///
    /// The reset runs exactly once and before the factory is first called.
    /// Any failure aborts the whole bring-up.
    pub fn bring_up<L, D, F>(
        channels: usize,
        settings: &KeyboardSettings,
        reset: &mut ResetSequencer<L, D>,
        mut factory: F,
    ) -> Result<Self>
    where
        L: ResetLine,
        D: Delay,
        F: FnMut(usize) -> std::result::Result<Box<dyn SensorChannel>, SensorFault>,
    {
        if channels == 0 {
            return Err(KeyboardError::NoChannels);
        }

        reset.reset()?;

        let mut sensors = Vec::with_capacity(channels);
        for channel in 0..channels {
            let sensor = factory(channel)
                .map_err(|source| KeyboardError::SensorInit { channel, source })?;
            sensors.push(sensor);
        }

        info!(channels, "keyboard ready");
        Self::new(sensors, settings)
    }

    /// Number of keys; fixed for the life of the keyboard
    pub fn num_channels(&self) -> usize {
        self.sensors.len()
    }

    /// Run one pass over every channel and return their levels.
    ///
    /// Never waits for a sensor: a channel without a fresh reading repeats
    /// its cached level. A drop-out is held back for one fresh reading at
    /// most. A sensor fault ends the pass with an error and no
    /// levels.
    pub fn poll_all(&mut self) -> Result<Levels> {
        let mut levels = vec![0.0; self.sensors.len()];

        for channel in 0..self.sensors.len() {
            let reading = self.sensors[channel].read().map_err(|source| {
                warn!(channel, error = %source, "sensor read failed");
                KeyboardError::SensorRead { channel, source }
            })?;

            let cached = self.cache.as_slice()[channel];
            levels[channel] = match reading {
                RawReading::NotReady => cached,
                RawReading::Ready(raw) => {
                    let candidate = self.calibrators[channel].normalize(raw);
                    let previous = self.last_verdict[channel];
                    let verdict = self.filter.screen(candidate, cached, levels[channel], previous);
                    self.last_verdict[channel] = verdict;
                    match verdict {
                        Verdict::Accept => {
                            self.cache.store(channel, candidate);
                            candidate
                        }
                        Verdict::Reject => {
                            self.glitches[channel] += 1;
                            debug!(channel, raw, candidate, cached, "glitch rejected");
                            cached
                        }
                    }
                }
            };
        }

        self.ticks += 1;
        Ok(levels)
    }

    /// Normalise a raw distance on one channel, widening its bounds if needed
    pub fn normalize(&mut self, channel: usize, raw: f64) -> Result<f64> {
        self.check_channel(channel)?;
        Ok(self.calibrators[channel].normalize(raw))
    }

    pub fn bounds(&self, channel: usize) -> Result<CalibrationBounds> {
        self.check_channel(channel)?;
        Ok(self.calibrators[channel].bounds())
    }

    /// Last accepted level for a channel
    pub fn cached(&self, channel: usize) -> Result<f64> {
        self.check_channel(channel)?;
        Ok(self.cache.as_slice()[channel])
    }

    pub fn phase(&self, channel: usize) -> Result<CalibrationPhase> {
        self.check_channel(channel)?;
        Ok(self.calibrators[channel].phase())
    }

    /// Drop-outs rejected on a channel so far
    pub fn glitches(&self, channel: usize) -> Result<u64> {
        self.check_channel(channel)?;
        Ok(self.glitches[channel])
    }

    /// Completed passes
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshot of every channel's calibration
    pub fn range_report(&self) -> RangeReport {
        let channels = self
            .calibrators
            .iter()
            .zip(self.cache.as_slice())
            .zip(&self.glitches)
            .map(|((calibrator, &level), &glitches)| ChannelRange {
                channel: calibrator.channel(),
                bounds: calibrator.bounds(),
                phase: calibrator.phase(),
                level,
                glitches,
            })
            .collect();

        RangeReport {
            ticks: self.ticks,
            channels,
        }
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel < self.sensors.len() {
            Ok(())
        } else {
            Err(KeyboardError::ChannelOutOfRange {
                channel,
                channels: self.sensors.len(),
            })
        }
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        let report = self.range_report();
        info!(
            ticks = report.ticks,
            min = ?report.minimums(),
            max = ?report.maximums(),
            "keyboard ranges"
        );
    }
}
