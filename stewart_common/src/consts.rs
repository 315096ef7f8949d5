//! System-wide constants for the Stewart platform workspace.
//!
//! Single source of truth for numeric limits and defaults.

use static_assertions::const_assert;

/// Minimum number of actuators for a well-defined pose → length map.
pub const MIN_ACTUATORS: usize = 3;

/// Maximum number of actuators (capacity of `ActuatorLengths`).
pub const MAX_ACTUATORS: usize = 12;

/// Default control frame rate [Hz] (50 ms frame).
pub const FRAME_RATE_HZ: f64 = 20.0;

/// Lowest accepted frame rate [Hz].
pub const FRAME_RATE_HZ_MIN: f64 = 1.0;

/// Highest accepted frame rate [Hz].
pub const FRAME_RATE_HZ_MAX: f64 = 1000.0;

/// Default swell dwell time [s].
pub const SWELL_DURATION_S: f64 = 4.0;

/// Longest accepted swell dwell time [s].
pub const SWELL_DURATION_S_MAX: f64 = 3600.0;

/// Default health band for the first sensor (CPU) [°C].
pub const CPU_WARN_BAND: (f64, f64) = (40.0, 60.0);

/// Default health band for the second sensor (GPU) [°C].
pub const GPU_WARN_BAND: (f64, f64) = (75.0, 90.0);

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/platform.toml";

const_assert!(MIN_ACTUATORS <= 6 && 6 <= MAX_ACTUATORS);
