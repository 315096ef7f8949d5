//! Health status types.
//!
//! A health sample combines two independent sensor readings, each checked
//! against its own `(warn_low, warn_high)` band. The worst band exceeded
//! across both sensors decides the severity; the severity maps to a display
//! color for the telemetry client's status line.

use serde::{Deserialize, Serialize};

/// Number of sensors combined into one health sample.
pub const SENSOR_COUNT: usize = 2;

/// Raw readings of both sensors (e.g. CPU and GPU temperature in °C).
pub type SensorReadings = [f64; SENSOR_COUNT];

/// Health severity, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Ok = 0,
    Warn = 1,
    Critical = 2,
}

impl Severity {
    #[inline]
    pub const fn color(self) -> StatusColor {
        match self {
            Self::Ok => StatusColor::Green,
            Self::Warn => StatusColor::Orange,
            Self::Critical => StatusColor::Red,
        }
    }
}

/// Display color for a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusColor {
    Green,
    Orange,
    Red,
}

impl StatusColor {
    /// Color name understood by the status line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green3",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for StatusColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warning band for a single sensor.
///
/// `value < warn_low` is Ok, `warn_low <= value < warn_high` is Warn,
/// `value >= warn_high` is Critical. A non-finite reading is Warn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub warn_low: f64,
    pub warn_high: f64,
}

impl ThresholdBand {
    pub const fn new(warn_low: f64, warn_high: f64) -> Self {
        Self {
            warn_low,
            warn_high,
        }
    }

    pub fn classify(&self, value: f64) -> Severity {
        if !value.is_finite() {
            Severity::Warn
        } else if value >= self.warn_high {
            Severity::Critical
        } else if value >= self.warn_low {
            Severity::Warn
        } else {
            Severity::Ok
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.warn_low.is_finite() && self.warn_high.is_finite()) || self.warn_low >= self.warn_high {
            return Err(format!(
                "warn_low {} must be below warn_high {}",
                self.warn_low, self.warn_high
            ));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for ThresholdBand {
    fn from((warn_low, warn_high): (f64, f64)) -> Self {
        Self::new(warn_low, warn_high)
    }
}

/// Derived health status, recomputed every sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthStatus {
    pub severity: Severity,
    pub color: StatusColor,
    pub readings: SensorReadings,
}

impl HealthStatus {
    pub fn new(severity: Severity, readings: SensorReadings) -> Self {
        Self {
            severity,
            color: severity.color(),
            readings,
        }
    }
}
