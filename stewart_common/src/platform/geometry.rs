//! Rig geometry, mechanical limits and actuator length vectors.
//!
//! [`Geometry`] and [`Limits`] are obtained once from the actuator driver at
//! startup and stay read-only for the lifetime of the process.
//! [`ActuatorLengths`] is a fixed-capacity vector so the per-frame path never
//! allocates.

use std::ops::Deref;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pose::{AxisArray, AXIS_COUNT};
use crate::consts::{MAX_ACTUATORS, MIN_ACTUATORS};

/// Minimum separation [mm] below which two attachment points are coincident.
const COINCIDENT_EPS: f64 = 1e-6;

/// Minimum cross-product magnitude [mm²] for a point set to span a plane.
const COLLINEAR_EPS: f64 = 1e-6;

/// Geometry or limits validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("actuator count {count} out of range [{min}, {max}]", min = MIN_ACTUATORS, max = MAX_ACTUATORS)]
    ActuatorCount { count: usize },

    #[error("base has {base} points but platform has {platform}")]
    MismatchedPoints { base: usize, platform: usize },

    #[error("{0} contains a non-finite coordinate")]
    NonFinite(&'static str),

    #[error("{set} points {a} and {b} coincide")]
    CoincidentPoints { set: &'static str, a: usize, b: usize },

    #[error("{set} points are collinear")]
    Collinear { set: &'static str },

    #[error("invalid limits: {0}")]
    InvalidLimits(String),

    #[error("more than {max} actuator lengths", max = MAX_ACTUATORS)]
    CapacityExceeded,
}

// ─── Actuator Lengths ───────────────────────────────────────────────

/// Ordered actuator lengths [mm], one per actuator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorLengths(heapless::Vec<f64, MAX_ACTUATORS>);

impl ActuatorLengths {
    pub fn new() -> Self {
        Self(heapless::Vec::new())
    }

    /// Build from a slice. Fails if the slice exceeds the fixed capacity.
    pub fn from_slice(values: &[f64]) -> Result<Self, GeometryError> {
        let mut out = Self::new();
        for &v in values {
            out.push(v)?;
        }
        Ok(out)
    }

    /// `count` copies of `value`.
    pub fn uniform(count: usize, value: f64) -> Result<Self, GeometryError> {
        let mut out = Self::new();
        for _ in 0..count {
            out.push(value)?;
        }
        Ok(out)
    }

    #[inline]
    pub fn push(&mut self, value: f64) -> Result<(), GeometryError> {
        self.0
            .push(value)
            .map_err(|_| GeometryError::CapacityExceeded)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    /// Largest absolute per-actuator difference to `other`.
    ///
    /// Returns `f64::INFINITY` when the lengths differ in count.
    pub fn max_abs_diff(&self, other: &ActuatorLengths) -> f64 {
        if self.len() != other.len() {
            return f64::INFINITY;
        }
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Deref for ActuatorLengths {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl std::fmt::Display for ActuatorLengths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.1}")?;
        }
        write!(f, "]")
    }
}

// ─── Geometry ───────────────────────────────────────────────────────

/// Attachment point description as stored in TOML.
///
/// ```toml
/// [driver.geometry]
/// home_height = 800.0
/// base = [[1000.0, 0.0, 0.0], ...]
/// platform = [[563.8, 205.2, 0.0], ...]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Base attachment points (fixed frame) [mm].
    pub base: Vec<[f64; 3]>,
    /// Platform attachment points (platform-local frame) [mm].
    pub platform: Vec<[f64; 3]>,
    /// Height of the platform-local origin above the base frame at the neutral pose [mm].
    pub home_height: f64,
}

/// Immutable rig geometry: N pairs of base/platform attachment points.
///
/// Actuator `i` spans from `base[i]` to `platform[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    base: Vec<Vector3<f64>>,
    platform: Vec<Vector3<f64>>,
    home_height: f64,
}

impl Geometry {
    /// Validate and build a geometry.
    pub fn new(
        base: Vec<Vector3<f64>>,
        platform: Vec<Vector3<f64>>,
        home_height: f64,
    ) -> Result<Self, GeometryError> {
        if base.len() != platform.len() {
            return Err(GeometryError::MismatchedPoints {
                base: base.len(),
                platform: platform.len(),
            });
        }
        let count = base.len();
        if !(MIN_ACTUATORS..=MAX_ACTUATORS).contains(&count) {
            return Err(GeometryError::ActuatorCount { count });
        }
        if !home_height.is_finite() {
            return Err(GeometryError::NonFinite("home_height"));
        }
        check_point_set("base", &base)?;
        check_point_set("platform", &platform)?;

        Ok(Self {
            base,
            platform,
            home_height,
        })
    }

    pub fn from_config(config: &GeometryConfig) -> Result<Self, GeometryError> {
        let to_vec = |p: &[f64; 3]| Vector3::new(p[0], p[1], p[2]);
        Self::new(
            config.base.iter().map(to_vec).collect(),
            config.platform.iter().map(to_vec).collect(),
            config.home_height,
        )
    }

    /// Symmetric six-actuator rig.
    ///
    /// Base points sit on a regular hexagon of `base_radius` at 0°, 60°, ….
    /// Platform point `i` sits on a circle of `platform_radius` at
    /// `60°·i ± spread_deg` (plus for even `i`, minus for odd), so adjacent
    /// legs lean in opposite directions.
    pub fn hexapod(
        base_radius: f64,
        platform_radius: f64,
        spread_deg: f64,
        home_height: f64,
    ) -> Result<Self, GeometryError> {
        let mut base = Vec::with_capacity(6);
        let mut platform = Vec::with_capacity(6);
        for i in 0..6 {
            let theta = (60.0 * i as f64).to_radians();
            base.push(Vector3::new(
                base_radius * theta.cos(),
                base_radius * theta.sin(),
                0.0,
            ));
            let spread = if i % 2 == 0 { spread_deg } else { -spread_deg };
            let phi = (60.0 * i as f64 + spread).to_radians();
            platform.push(Vector3::new(
                platform_radius * phi.cos(),
                platform_radius * phi.sin(),
                0.0,
            ));
        }
        Self::new(base, platform, home_height)
    }

    #[inline]
    pub fn actuator_count(&self) -> usize {
        self.base.len()
    }

    #[inline]
    pub fn base_points(&self) -> &[Vector3<f64>] {
        &self.base
    }

    #[inline]
    pub fn platform_points(&self) -> &[Vector3<f64>] {
        &self.platform
    }

    #[inline]
    pub fn home_height(&self) -> f64 {
        self.home_height
    }

    /// Export as a TOML-friendly config.
    pub fn to_config(&self) -> GeometryConfig {
        let to_arr = |v: &Vector3<f64>| [v.x, v.y, v.z];
        GeometryConfig {
            base: self.base.iter().map(to_arr).collect(),
            platform: self.platform.iter().map(to_arr).collect(),
            home_height: self.home_height,
        }
    }
}

fn check_point_set(set: &'static str, points: &[Vector3<f64>]) -> Result<(), GeometryError> {
    if points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
        return Err(GeometryError::NonFinite(set));
    }
    for a in 0..points.len() {
        for b in (a + 1)..points.len() {
            if (points[a] - points[b]).norm() < COINCIDENT_EPS {
                return Err(GeometryError::CoincidentPoints { set, a, b });
            }
        }
    }
    // Coincidence is excluded above, so points[1] - points[0] is non-zero.
    let dir = points[1] - points[0];
    let spans_plane = points[2..]
        .iter()
        .any(|p| dir.cross(&(p - points[0])).norm() > COLLINEAR_EPS);
    if !spans_plane {
        return Err(GeometryError::Collinear { set });
    }
    Ok(())
}

// ─── Limits ─────────────────────────────────────────────────────────

/// Mechanical limits of the rig.
///
/// Actuator bounds are per actuator; travel, velocity and acceleration are
/// per pose axis (mm, mm/s, mm/s² for translations; rad, rad/s, rad/s² for
/// rotations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Minimum actuator length [mm], per actuator.
    pub min_length: Vec<f64>,
    /// Maximum actuator length [mm], per actuator.
    pub max_length: Vec<f64>,
    /// Maximum excursion from the neutral pose, per axis.
    pub travel: AxisArray,
    /// Maximum pose velocity, per axis.
    pub max_velocity: AxisArray,
    /// Maximum pose acceleration, per axis (optional).
    #[serde(default)]
    pub max_accel: Option<AxisArray>,
}

impl Limits {
    /// Limits with the same length bounds for every actuator.
    pub fn uniform(
        actuator_count: usize,
        min_length: f64,
        max_length: f64,
        travel: AxisArray,
        max_velocity: AxisArray,
    ) -> Self {
        Self {
            min_length: vec![min_length; actuator_count],
            max_length: vec![max_length; actuator_count],
            travel,
            max_velocity,
            max_accel: None,
        }
    }

    /// Validate against the actuator count of the geometry they belong to.
    pub fn validate(&self, actuator_count: usize) -> Result<(), GeometryError> {
        if self.min_length.len() != actuator_count || self.max_length.len() != actuator_count {
            return Err(GeometryError::InvalidLimits(format!(
                "expected {actuator_count} length bounds, got min={} max={}",
                self.min_length.len(),
                self.max_length.len()
            )));
        }
        for (i, (lo, hi)) in self.min_length.iter().zip(&self.max_length).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || *lo <= 0.0 || lo >= hi {
                return Err(GeometryError::InvalidLimits(format!(
                    "actuator {i}: min_length {lo} must be positive and below max_length {hi}"
                )));
            }
        }
        for i in 0..AXIS_COUNT {
            if !(self.travel[i] > 0.0 && self.travel[i].is_finite()) {
                return Err(GeometryError::InvalidLimits(format!(
                    "travel[{i}] = {} must be positive",
                    self.travel[i]
                )));
            }
            if !(self.max_velocity[i] > 0.0 && self.max_velocity[i].is_finite()) {
                return Err(GeometryError::InvalidLimits(format!(
                    "max_velocity[{i}] = {} must be positive",
                    self.max_velocity[i]
                )));
            }
        }
        if let Some(accel) = &self.max_accel {
            if let Some(i) = accel.iter().position(|a| !(*a > 0.0 && a.is_finite())) {
                return Err(GeometryError::InvalidLimits(format!(
                    "max_accel[{i}] = {} must be positive",
                    accel[i]
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn actuator_count(&self) -> usize {
        self.min_length.len()
    }

    /// True when `length` is within `[min_length, max_length]` of actuator `i`.
    #[inline]
    pub fn length_in_range(&self, i: usize, length: f64) -> bool {
        length >= self.min_length[i] && length <= self.max_length[i]
    }

    /// Clamp `length` into the bounds of actuator `i`.
    #[inline]
    pub fn clamp_length(&self, i: usize, length: f64) -> f64 {
        length.clamp(self.min_length[i], self.max_length[i])
    }
}
