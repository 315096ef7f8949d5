//! Temperature sources for the health status.
//!
//! - [`sysfs`] - Linux thermal zone files
//! - [`fixed`] - Constant readings

pub mod fixed;
pub mod sysfs;

pub use fixed::FixedTemperatureSource;
pub use sysfs::SysfsThermalSource;

use stewart_common::hal::sensor::TemperatureSource;
use stewart_common::platform::config::TemperatureSourceConfig;

/// Create the temperature source described by `config`.
pub fn create_source(config: &TemperatureSourceConfig) -> Box<dyn TemperatureSource> {
    match config {
        TemperatureSourceConfig::Sysfs { paths } => {
            Box::new(SysfsThermalSource::new([&paths[0], &paths[1]]))
        }
        TemperatureSourceConfig::Fixed { readings } => {
            Box::new(FixedTemperatureSource::new(*readings))
        }
    }
}
