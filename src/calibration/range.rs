//! Range calibrator
//!
//! Tracks the smallest and largest raw distance a key has ever reported and
//! scales readings into 0..1 against them. No calibration is needed up
//! front: the bounds start at sentinels and are pulled into place by
//! whatever the sensor actually reports.

use serde::Serialize;
use tracing::debug;

/// Observed raw-distance bounds for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationBounds {
    pub min: f64,
    pub max: f64,
}

impl CalibrationBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`; zero or negative while warming up
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Whether readings have pulled the bounds apart yet
    pub fn is_spread(&self) -> bool {
        self.range() > 0.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Where a channel is in its calibration.
///
/// Reported for diagnostics only; output is computed the same way in
/// every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPhase {
    /// Still on the sentinel bounds
    Uninitialized,
    /// Bounds not yet apart, or widened recently
    Warming,
    /// Bounds apart and unchanged for a while
    Stable,
}

/// Per-channel adaptive calibrator
#[derive(Debug, Clone)]
pub struct RangeCalibrator {
    channel: usize,
    bounds: CalibrationBounds,
    precision: u32,
    stable_after: u64,
    observations: u64,
    unchanged_run: u64,
}

impl RangeCalibrator {
    /// Create a calibrator starting from sentinel bounds
    pub fn new(channel: usize, sentinel: CalibrationBounds) -> Self {
        Self {
            channel,
            bounds: sentinel,
            precision: 2,
            stable_after: 50,
            observations: 0,
            unchanged_run: 0,
        }
    }

    /// Set the number of decimal places kept in the output
    pub fn with_precision(mut self, places: u32) -> Self {
        self.precision = places;
        self
    }

    /// Set how many consecutive in-range readings count as stable
    pub fn with_stable_after(mut self, readings: u64) -> Self {
        self.stable_after = readings;
        self
    }

    /// Map a raw distance into 0..1, widening the bounds if it is a new
    /// extreme.
    ///
    /// Only one bound moves per call. When the bounds have no spread yet the
    /// current `max` is returned as-is, so warm-up output can fall outside
    /// 0..1.
    pub fn normalize(&mut self, raw: f64) -> f64 {
        self.observations += 1;

        if raw < self.bounds.min {
            self.bounds.min = raw;
            self.widened();
        } else if raw > self.bounds.max {
            self.bounds.max = raw;
            self.widened();
        } else {
            self.unchanged_run += 1;
        }

        let range = self.bounds.range();
        if range > 0.0 {
            round_to((raw - self.bounds.min) / range, self.precision)
        } else {
            self.bounds.max
        }
    }

    fn widened(&mut self) {
        self.unchanged_run = 0;
        debug!(
            channel = self.channel,
            min = self.bounds.min,
            max = self.bounds.max,
            "calibration bounds widened"
        );
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn bounds(&self) -> CalibrationBounds {
        self.bounds
    }

    /// Number of readings seen
    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn phase(&self) -> CalibrationPhase {
        if self.observations == 0 {
            CalibrationPhase::Uninitialized
        } else if self.bounds.is_spread() && self.unchanged_run >= self.stable_after {
            CalibrationPhase::Stable
        } else {
            CalibrationPhase::Warming
        }
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated(min: f64, max: f64) -> RangeCalibrator {
        RangeCalibrator::new(0, CalibrationBounds::new(min, max))
    }

    #[test]
    fn test_midpoint() {
        let mut cal = calibrated(100.0, 200.0);
        assert_eq!(cal.normalize(150.0), 0.5);
    }

    #[test]
    fn test_new_maximum_widens() {
        let mut cal = calibrated(80.0, 200.0);
        assert_eq!(cal.normalize(250.0), 1.0);
        assert_eq!(cal.bounds(), CalibrationBounds::new(80.0, 250.0));
    }

    #[test]
    fn test_new_minimum_widens() {
        let mut cal = calibrated(100.0, 200.0);
        assert_eq!(cal.normalize(70.0), 0.0);
        assert_eq!(cal.bounds(), CalibrationBounds::new(70.0, 200.0));
    }

    #[test]
    fn test_inside_range_is_noop() {
        let mut cal = calibrated(80.0, 250.0);
        cal.normalize(150.0);
        assert_eq!(cal.bounds(), CalibrationBounds::new(80.0, 250.0));
    }

    #[test]
    fn test_degenerate_range_returns_max() {
        // Equal bounds
        let mut cal = calibrated(120.0, 120.0);
        assert_eq!(cal.normalize(120.0), 120.0);

        // Inverted bounds: 500 lowers min to 500, still above max
        let mut cal = calibrated(1000.0, 0.0);
        assert_eq!(cal.normalize(500.0), 0.0);
        assert_eq!(cal.bounds(), CalibrationBounds::new(500.0, 0.0));
    }

    #[test]
    fn test_rounds_to_two_places() {
        let mut cal = calibrated(0.0, 300.0);
        assert_eq!(cal.normalize(100.0), 0.33);
        assert_eq!(cal.normalize(200.0), 0.67);
    }

    #[test]
    fn test_custom_precision() {
        let mut cal = calibrated(0.0, 300.0).with_precision(3);
        assert_eq!(cal.normalize(100.0), 0.333);
    }

    #[test]
    fn test_bounds_contain_every_value_once_warm() {
        let mut cal = calibrated(1000.0, 0.0);
        let readings = [300.0, 20.0, 310.0, 150.0, 5.0, 290.0, 400.0, 120.0];
        let mut seen = Vec::new();
        for raw in readings {
            let out = cal.normalize(raw);
            seen.push(raw);
            let bounds = cal.bounds();
            if bounds.min <= bounds.max {
                assert!(seen.iter().all(|v| bounds.contains(*v)));
                assert!((0.0..=1.0).contains(&out), "output {out}");
            }
        }
    }

    #[test]
    fn test_phase_progression() {
        let mut cal = calibrated(1000.0, 0.0).with_stable_after(3);
        assert_eq!(cal.phase(), CalibrationPhase::Uninitialized);

        cal.normalize(300.0);
        assert_eq!(cal.phase(), CalibrationPhase::Warming);
        cal.normalize(400.0);
        cal.normalize(20.0);
        assert_eq!(cal.phase(), CalibrationPhase::Warming);

        for _ in 0..3 {
            cal.normalize(200.0);
        }
        assert_eq!(cal.phase(), CalibrationPhase::Stable);

        cal.normalize(10.0);
        assert_eq!(cal.phase(), CalibrationPhase::Warming);
    }
}
