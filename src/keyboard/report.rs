//! Calibration range report

use crate::calibration::{CalibrationBounds, CalibrationPhase};
use serde::Serialize;
use std::fmt;

/// Calibration state of one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRange {
    pub channel: usize,
    pub bounds: CalibrationBounds,
    pub phase: CalibrationPhase,
    /// Last accepted level
    pub level: f64,
    pub glitches: u64,
}

/// Calibration state of every channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeReport {
    pub ticks: u64,
    pub channels: Vec<ChannelRange>,
}

impl RangeReport {
    pub fn minimums(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.bounds.min).collect()
    }

    pub fn maximums(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.bounds.max).collect()
    }
}

impl fmt::Display for RangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "after {} polls", self.ticks)?;
        writeln!(
            f,
            "{:>3} {:>8} {:>8} {:>6} {:>8}  phase",
            "ch", "min", "max", "level", "glitches"
        )?;
        for c in &self.channels {
            let phase = match c.phase {
                CalibrationPhase::Uninitialized => "uninitialized",
                CalibrationPhase::Warming => "warming",
                CalibrationPhase::Stable => "stable",
            };
            writeln!(
                f,
                "{:>3} {:>8.1} {:>8.1} {:>6.2} {:>8}  {}",
                c.channel, c.bounds.min, c.bounds.max, c.level, c.glitches, phase
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_each_channel() {
        let report = RangeReport {
            ticks: 12,
            channels: vec![
                ChannelRange {
                    channel: 0,
                    bounds: CalibrationBounds::new(18.0, 305.0),
                    phase: CalibrationPhase::Stable,
                    level: 0.42,
                    glitches: 2,
                },
                ChannelRange {
                    channel: 1,
                    bounds: CalibrationBounds::new(8190.0, 0.0),
                    phase: CalibrationPhase::Uninitialized,
                    level: 0.0,
                    glitches: 0,
                },
            ],
        };

        let text = report.to_string();
        assert!(text.starts_with("after 12 polls"));
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("stable"));
        assert!(text.contains("uninitialized"));
    }
}
