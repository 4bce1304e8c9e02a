//! Depth to volume mapping
//!
//! A level near zero means the finger is close to the sensor, i.e. the key
//! is pushed down, so volume rises as the level falls. Only the first
//! `max_depth` of the travel is used; anything further away is silence.

use super::Mapper;

/// Maps a key level to a voice volume: `scale * (max_depth - min(level, max_depth))`
pub struct DepthVolumeMapper {
    max_depth: f64,
    scale: f64,
}

impl DepthVolumeMapper {
    /// Create a mapper over the first `max_depth` of travel, unscaled
    pub fn new(max_depth: f64) -> Self {
        Self {
            max_depth,
            scale: 1.0,
        }
    }

    /// Set the output multiplier
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Scale so that a full press reaches `peak`
    pub fn with_peak(self, peak: f64) -> Self {
        let scale = if self.max_depth > 0.0 {
            peak / self.max_depth
        } else {
            0.0
        };
        self.with_scale(scale)
    }

    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }
}

impl Mapper for DepthVolumeMapper {
    fn name(&self) -> &str {
        "depth_volume"
    }

    fn map(&self, level: f64) -> f64 {
        self.scale * (self.max_depth - level.min(self.max_depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_far_hand_is_silent() {
        let mapper = DepthVolumeMapper::new(0.1);
        assert_eq!(mapper.map(0.1), 0.0);
        assert_eq!(mapper.map(0.8), 0.0);
        // Warm-up output can exceed 1
        assert_eq!(mapper.map(310.0), 0.0);
    }

    #[test]
    fn test_full_press_is_loudest() {
        let mapper = DepthVolumeMapper::new(0.1);
        assert_eq!(mapper.map(0.0), 0.1);
    }

    #[test]
    fn test_peak_scaling() {
        // Half volume at full press over the first 1% of travel
        let mapper = DepthVolumeMapper::new(0.01).with_peak(0.5);
        assert!((mapper.map(0.0) - 0.5).abs() < 1e-12);
        assert!((mapper.map(0.005) - 0.25).abs() < 1e-12);
        assert_eq!(mapper.map(0.02), 0.0);
    }
}
