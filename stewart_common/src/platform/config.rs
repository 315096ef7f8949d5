//! Configuration structures for the platform controller.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! sections and fields use `#[serde(default)]`; the `[shape]` and `[driver]`
//! sections are mandatory because the controller cannot run safely without
//! them.
//!
//! ```toml
//! [shared]
//! service_name = "stewart-cu"
//!
//! [loop]
//! frame_rate_hz = 20.0
//!
//! [shape]
//! max_rate = [300.0, 300.0, 200.0, 0.8, 0.8, 0.8]
//!
//! [driver.geometry]
//! ...
//! ```

use serde::{Deserialize, Serialize};

use super::geometry::{GeometryConfig, Limits};
use super::health::{SensorReadings, ThresholdBand};
use super::pose::{AngleUnit, AxisArray, Pose, AXIS_COUNT};
use super::state::PlatformCommand;
use crate::config::SharedConfig;
use crate::consts::{
    CPU_WARN_BAND, FRAME_RATE_HZ, FRAME_RATE_HZ_MAX, FRAME_RATE_HZ_MIN, GPU_WARN_BAND,
    SWELL_DURATION_S, SWELL_DURATION_S_MAX,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete controller configuration (`platform.toml`).
///
/// Loaded once at startup, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub shared: SharedConfig,
    #[serde(rename = "loop", default)]
    pub control_loop: LoopConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    pub shape: ShapeConfig,
    #[serde(default)]
    pub poses: PoseConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub driver: DriverConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

// ─── Loop ───────────────────────────────────────────────────────────

/// What the loop does with pose requests while the platform is not Enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Run shaping and kinematics but do not drive the actuators.
    #[default]
    TrackWhileInactive,
    /// Ignore pose requests entirely.
    SkipWhileInactive,
}

/// What the loop does when a shaped pose leaves the actuator envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopePolicy {
    /// Drop the frame; the actuators keep the previous command.
    #[default]
    HoldLast,
    /// Clamp each actuator into `[min_length, max_length]` and drive.
    ClampLengths,
}

/// Control loop timing and policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Frame rate [Hz] (default: 20 = 50 ms).
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: f64,

    /// Health sampling period [frames] (default: one second of frames).
    #[serde(default)]
    pub health_interval_frames: Option<u32>,

    #[serde(default)]
    pub move_policy: MovePolicy,

    #[serde(default)]
    pub envelope_policy: EnvelopePolicy,

    /// Emit a per-frame actuator projection at TRACE level.
    #[serde(default)]
    pub log_muscles: bool,
}

fn default_frame_rate_hz() -> f64 {
    FRAME_RATE_HZ
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: FRAME_RATE_HZ,
            health_interval_frames: None,
            move_policy: MovePolicy::default(),
            envelope_policy: EnvelopePolicy::default(),
            log_muscles: false,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(FRAME_RATE_HZ_MIN..=FRAME_RATE_HZ_MAX).contains(&self.frame_rate_hz) {
            return Err(format!(
                "frame_rate_hz {} out of range [{}, {}]",
                self.frame_rate_hz, FRAME_RATE_HZ_MIN, FRAME_RATE_HZ_MAX
            ));
        }
        if self.health_interval_frames == Some(0) {
            return Err("health_interval_frames must be at least 1".to_string());
        }
        Ok(())
    }

    /// Frame interval [s].
    #[inline]
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }

    /// Health sampling period [frames].
    pub fn health_interval(&self) -> u64 {
        match self.health_interval_frames {
            Some(n) => n as u64,
            None => (self.frame_rate_hz.round() as u64).max(1),
        }
    }
}

// ─── Units ──────────────────────────────────────────────────────────

/// Euler composition order of the pose rotation.
///
/// Only intrinsic Z-Y-X (yaw, then pitch, then roll about the moving axes;
/// equivalently `Rz(yaw) · Ry(pitch) · Rx(roll)`) is supported. It is still
/// spelled out in the config so a rig file states its convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EulerOrder {
    #[default]
    Zyx,
}

/// Units of the external pose representation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(default)]
    pub angles: AngleUnit,
    #[serde(default)]
    pub euler_order: EulerOrder,
}

// ─── Shaping ────────────────────────────────────────────────────────

/// Motion shaping parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeConfig {
    /// Scale applied on top of the per-axis gains (default: 1.0).
    #[serde(default = "default_gain")]
    pub master_gain: f64,

    /// Per-axis gain for normalized input (default: 1.0).
    #[serde(default = "default_gains")]
    pub gains: AxisArray,

    /// Per-axis washout time constant [s]. Zero disables washout on that axis.
    #[serde(default)]
    pub washout_tc: AxisArray,

    /// Per-axis maximum rate of change of the shaped pose [unit/s].
    pub max_rate: AxisArray,

    /// Per-axis maximum acceleration of the shaped pose [unit/s²] (optional).
    #[serde(default)]
    pub max_accel: Option<AxisArray>,

    /// Per-axis smoothing time constant [s]. Zero disables the low-pass.
    #[serde(default)]
    pub smoothing_tc: AxisArray,
}

fn default_gain() -> f64 {
    1.0
}
fn default_gains() -> AxisArray {
    [1.0; AXIS_COUNT]
}

impl ShapeConfig {
    /// Config with unit gains, no washout and no smoothing.
    pub fn with_max_rate(max_rate: AxisArray) -> Self {
        Self {
            master_gain: 1.0,
            gains: default_gains(),
            washout_tc: [0.0; AXIS_COUNT],
            max_rate,
            max_accel: None,
            smoothing_tc: [0.0; AXIS_COUNT],
        }
    }

    /// Validate parameter bounds and consistency with the rig limits.
    pub fn validate(&self, limits: &Limits) -> Result<(), String> {
        if !(self.master_gain.is_finite() && self.master_gain >= 0.0) {
            return Err(format!("master_gain {} must be >= 0", self.master_gain));
        }
        check_non_negative("gains", &self.gains)?;
        check_non_negative("washout_tc", &self.washout_tc)?;
        check_non_negative("smoothing_tc", &self.smoothing_tc)?;

        for i in 0..AXIS_COUNT {
            let rate = self.max_rate[i];
            if !(rate.is_finite() && rate > 0.0) {
                return Err(format!("max_rate[{i}] = {rate} must be positive"));
            }
            if rate > limits.max_velocity[i] {
                return Err(format!(
                    "max_rate[{i}] = {rate} exceeds rig max_velocity {}",
                    limits.max_velocity[i]
                ));
            }
        }

        if let Some(accel) = &self.max_accel {
            for i in 0..AXIS_COUNT {
                if !(accel[i].is_finite() && accel[i] > 0.0) {
                    return Err(format!("max_accel[{i}] = {} must be positive", accel[i]));
                }
                if let Some(rig) = &limits.max_accel {
                    if accel[i] > rig[i] {
                        return Err(format!(
                            "max_accel[{i}] = {} exceeds rig max_accel {}",
                            accel[i], rig[i]
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_non_negative(name: &str, values: &AxisArray) -> Result<(), String> {
    match values.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
        Some(i) => Err(format!("{name}[{i}] = {} must be >= 0", values[i])),
        None => Ok(()),
    }
}

// ─── Fixed Poses ────────────────────────────────────────────────────

/// Platform-defined fixed poses, in physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Neutral pose that shaping is centred on.
    #[serde(default)]
    pub home: Pose,
    /// Rest pose for Idle.
    #[serde(default)]
    pub idle: Pose,
    /// Primed pose for Ready.
    #[serde(default)]
    pub ready: Pose,
    /// Raised pose held during Swell.
    #[serde(default)]
    pub swell: Pose,
    /// Swell dwell time [s] (default: 4.0).
    #[serde(default = "default_swell_duration")]
    pub swell_duration_s: f64,
}

fn default_swell_duration() -> f64 {
    SWELL_DURATION_S
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            home: Pose::ZERO,
            idle: Pose::ZERO,
            ready: Pose::ZERO,
            swell: Pose::ZERO,
            swell_duration_s: SWELL_DURATION_S,
        }
    }
}

impl PoseConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, pose) in self.named() {
            pose.validate().map_err(|e| format!("poses.{name}: {e}"))?;
        }
        if !(self.swell_duration_s > 0.0 && self.swell_duration_s <= SWELL_DURATION_S_MAX) {
            return Err(format!(
                "swell_duration_s {} must be in (0, {SWELL_DURATION_S_MAX}]",
                self.swell_duration_s
            ));
        }
        Ok(())
    }

    /// All fixed poses with their config names.
    pub fn named(&self) -> [(&'static str, Pose); 4] {
        [
            ("home", self.home),
            ("idle", self.idle),
            ("ready", self.ready),
            ("swell", self.swell),
        ]
    }
}

// ─── Health ─────────────────────────────────────────────────────────

/// Where health readings come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemperatureSourceConfig {
    /// Linux thermal zone files reporting millidegrees.
    Sysfs { paths: [String; 2] },
    /// Constant readings (bench setups and tests).
    Fixed { readings: SensorReadings },
}

impl Default for TemperatureSourceConfig {
    fn default() -> Self {
        Self::Fixed {
            readings: [25.0, 25.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Warning bands for the two sensors.
    #[serde(default = "default_bands")]
    pub bands: [ThresholdBand; 2],
    #[serde(default)]
    pub source: TemperatureSourceConfig,
}

fn default_bands() -> [ThresholdBand; 2] {
    [CPU_WARN_BAND.into(), GPU_WARN_BAND.into()]
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            source: TemperatureSourceConfig::default(),
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (i, band) in self.bands.iter().enumerate() {
            band.validate().map_err(|e| format!("bands[{i}]: {e}"))?;
        }
        Ok(())
    }
}

// ─── Driver ─────────────────────────────────────────────────────────

/// Actuator driver selection and rig description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Registered driver name (default: "simulation").
    #[serde(default = "default_driver_name")]
    pub name: String,
    /// Human-readable rig name.
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
    pub geometry: GeometryConfig,
    pub limits: Limits,
    /// Actuator slew speed used by the simulation driver [mm/s].
    #[serde(default = "default_actuator_speed")]
    pub actuator_speed: f64,
}

fn default_driver_name() -> String {
    "simulation".to_string()
}
fn default_platform_name() -> String {
    "Stewart platform".to_string()
}
fn default_actuator_speed() -> f64 {
    400.0
}

// ─── Telemetry ──────────────────────────────────────────────────────

/// One scripted telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Frame number at which the entry fires.
    pub frame: u64,
    #[serde(default)]
    pub command: Option<PlatformCommand>,
    /// Pose request; also becomes the client's current pose.
    #[serde(default)]
    pub pose: Option<Pose>,
}

/// Telemetry client selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Client kind (default: "scripted").
    #[serde(default = "default_telemetry_kind")]
    pub kind: String,
    /// Poses are normalized `[-1, 1]` per axis rather than physical units.
    #[serde(default = "default_normalized")]
    pub normalized: bool,
    /// Answer given when a `quit` asks for confirmation.
    #[serde(default = "default_confirm_quit")]
    pub confirm_quit: bool,
    #[serde(default)]
    pub script: Vec<ScriptEntry>,
}

fn default_telemetry_kind() -> String {
    "scripted".to_string()
}
fn default_normalized() -> bool {
    true
}
fn default_confirm_quit() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            kind: default_telemetry_kind(),
            normalized: default_normalized(),
            confirm_quit: default_confirm_quit(),
            script: Vec::new(),
        }
    }
}
