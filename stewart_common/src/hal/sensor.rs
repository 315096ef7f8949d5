//! Raw health sensor interface.

use crate::hal::driver::HalError;
use crate::platform::health::SensorReadings;

/// Source of the two raw readings that feed the health status.
pub trait TemperatureSource: Send {
    fn name(&self) -> &'static str;

    /// Read both sensors.
    fn read(&mut self) -> Result<SensorReadings, HalError>;
}
