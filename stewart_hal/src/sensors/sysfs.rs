//! Linux thermal zone reader.
//!
//! Each path points at a `temp` file such as
//! `/sys/class/thermal/thermal_zone0/temp`, which holds an integer in
//! millidegrees Celsius.

use std::fs;
use std::path::{Path, PathBuf};

use stewart_common::hal::driver::HalError;
use stewart_common::hal::sensor::TemperatureSource;
use stewart_common::platform::health::SensorReadings;

#[derive(Debug, Clone)]
pub struct SysfsThermalSource {
    paths: [PathBuf; 2],
}

impl SysfsThermalSource {
    pub fn new<P: AsRef<Path>>(paths: [P; 2]) -> Self {
        let [a, b] = paths;
        Self {
            paths: [a.as_ref().to_path_buf(), b.as_ref().to_path_buf()],
        }
    }

    fn read_zone(path: &Path) -> Result<f64, HalError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| HalError::SensorError(format!("{}: {e}", path.display())))?;
        let millideg: i64 = raw
            .trim()
            .parse()
            .map_err(|e| HalError::SensorError(format!("{}: {e}", path.display())))?;
        Ok(millideg as f64 / 1000.0)
    }
}

impl TemperatureSource for SysfsThermalSource {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn read(&mut self) -> Result<SensorReadings, HalError> {
        Ok([
            Self::read_zone(&self.paths[0])?,
            Self::read_zone(&self.paths[1])?,
        ])
    }
}
