//! Health sampling.
//!
//! Two raw readings are classified against their own bands; the worst
//! severity wins. A failed read counts as Warn with NaN readings.

use stewart_common::hal::sensor::TemperatureSource;
use stewart_common::platform::health::{HealthStatus, SensorReadings, Severity, ThresholdBand};
use tracing::{debug, info, warn};

/// Combined severity of both readings.
pub fn classify(readings: &SensorReadings, bands: &[ThresholdBand; 2]) -> Severity {
    readings
        .iter()
        .zip(bands)
        .map(|(&value, band)| band.classify(value))
        .max()
        .unwrap_or_default()
}

/// Periodic health sampler.
pub struct HealthMonitor {
    source: Box<dyn TemperatureSource>,
    bands: [ThresholdBand; 2],
    last: Option<Severity>,
}

impl HealthMonitor {
    pub fn new(source: Box<dyn TemperatureSource>, bands: [ThresholdBand; 2]) -> Self {
        Self {
            source,
            bands,
            last: None,
        }
    }

    /// Read the sensors and derive the status.
    pub fn sample(&mut self) -> HealthStatus {
        let readings = match self.source.read() {
            Ok(r) => r,
            Err(e) => {
                warn!("Health sensor '{}' read failed: {e}", self.source.name());
                [f64::NAN; 2]
            }
        };
        let status = HealthStatus::new(classify(&readings, &self.bands), readings);

        if self.last != Some(status.severity) {
            info!(
                "Health {:?} ({}): {:.1} / {:.1}",
                status.severity, status.color, readings[0], readings[1]
            );
        } else {
            debug!("Health {:?}: {:.1} / {:.1}", status.severity, readings[0], readings[1]);
        }
        self.last = Some(status.severity);
        status
    }
}
