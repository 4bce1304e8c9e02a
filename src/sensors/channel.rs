//! SensorChannel trait and RawReading definition

use crate::error::SensorFault;

/// One poll's worth of data from a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawReading {
    /// No fresh measurement since the last read
    NotReady,
    /// Fresh distance in sensor-native units (millimetres for the VL53L0X)
    Ready(f64),
}

impl RawReading {
    /// Distance if a fresh reading is available
    pub fn distance(&self) -> Option<f64> {
        match self {
            RawReading::NotReady => None,
            RawReading::Ready(distance) => Some(*distance),
        }
    }
}

/// A single free-running distance sensor behind the multiplexer.
///
/// Both calls are treated as plain reads by the keyboard; latency is up to
/// the implementation, but neither should block waiting for a measurement.
pub trait SensorChannel: Send {
    /// Whether a new measurement is available
    fn is_ready(&mut self) -> Result<bool, SensorFault>;

    /// The latest measured distance
    fn raw_distance(&mut self) -> Result<f64, SensorFault>;

    /// Readiness check followed by a distance read when ready
    fn read(&mut self) -> Result<RawReading, SensorFault> {
        if self.is_ready()? {
            Ok(RawReading::Ready(self.raw_distance()?))
        } else {
            Ok(RawReading::NotReady)
        }
    }
}

impl<S: SensorChannel + ?Sized> SensorChannel for Box<S> {
    fn is_ready(&mut self) -> Result<bool, SensorFault> {
        (**self).is_ready()
    }

    fn raw_distance(&mut self) -> Result<f64, SensorFault> {
        (**self).raw_distance()
    }

    fn read(&mut self) -> Result<RawReading, SensorFault> {
        (**self).read()
    }
}
