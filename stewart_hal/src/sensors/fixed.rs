//! Constant temperature readings for bench setups and tests.

use stewart_common::hal::driver::HalError;
use stewart_common::hal::sensor::TemperatureSource;
use stewart_common::platform::health::SensorReadings;

#[derive(Debug, Clone)]
pub struct FixedTemperatureSource {
    readings: SensorReadings,
}

impl FixedTemperatureSource {
    pub fn new(readings: SensorReadings) -> Self {
        Self { readings }
    }

    /// Replace the readings returned from now on.
    pub fn set(&mut self, readings: SensorReadings) {
        self.readings = readings;
    }
}

impl TemperatureSource for FixedTemperatureSource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn read(&mut self) -> Result<SensorReadings, HalError> {
        Ok(self.readings)
    }
}
