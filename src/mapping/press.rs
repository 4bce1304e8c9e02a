//! Key press detection
//!
//! A key counts as pressed while its level sits below a threshold.

use super::Mapper;

/// Level-based press detector.
///
/// As a [`Mapper`] it outputs the trigger value while pressed and the rest
/// value otherwise.
pub struct PressDetector {
    threshold: f64,
    trigger_value: f64,
    rest_value: f64,
}

impl PressDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            trigger_value: 1.0,
            rest_value: 0.0,
        }
    }

    /// Set the value to output while pressed
    pub fn with_trigger_value(mut self, value: f64) -> Self {
        self.trigger_value = value;
        self
    }

    /// Set the value to output while released
    pub fn with_rest_value(mut self, value: f64) -> Self {
        self.rest_value = value;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_pressed(&self, level: f64) -> bool {
        level < self.threshold
    }
}

impl Default for PressDetector {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Mapper for PressDetector {
    fn name(&self) -> &str {
        "press"
    }

    fn map(&self, level: f64) -> f64 {
        if self.is_pressed(level) {
            self.trigger_value
        } else {
            self.rest_value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_below_threshold() {
        let detector = PressDetector::default();
        assert!(detector.is_pressed(0.0));
        assert!(detector.is_pressed(0.09));
        assert!(!detector.is_pressed(0.1));
        assert!(!detector.is_pressed(0.7));
    }

    #[test]
    fn test_custom_values() {
        let detector = PressDetector::new(0.3)
            .with_trigger_value(127.0)
            .with_rest_value(-1.0);
        assert_eq!(detector.map(0.1), 127.0);
        assert_eq!(detector.map(0.5), -1.0);
    }
}
