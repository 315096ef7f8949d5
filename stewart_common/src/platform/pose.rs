//! Six-degree-of-freedom pose representation.
//!
//! A [`Pose`] holds three translations (surge, sway, heave) in millimetres and
//! three rotations (roll, pitch, yaw) in radians. The composition order is
//! fixed for the whole workspace: the platform is rotated by
//! `Rz(yaw) · Ry(pitch) · Rx(roll)` about its centre, then translated by
//! `(surge, sway, heave)` plus the rig's home height.
//!
//! External feeds may deliver angles in degrees; [`AngleUnit`] converts them
//! to radians at intake so nothing downstream ever sees degrees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of pose axes.
pub const AXIS_COUNT: usize = 6;

/// One value per pose axis, indexed by [`Axis::index`].
pub type AxisArray = [f64; AXIS_COUNT];

/// Pose axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Axis {
    /// Longitudinal translation (x).
    Surge = 0,
    /// Lateral translation (y).
    Sway = 1,
    /// Vertical translation (z).
    Heave = 2,
    /// Rotation about x.
    Roll = 3,
    /// Rotation about y.
    Pitch = 4,
    /// Rotation about z.
    Yaw = 5,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Axis; AXIS_COUNT] = [
        Axis::Surge,
        Axis::Sway,
        Axis::Heave,
        Axis::Roll,
        Axis::Pitch,
        Axis::Yaw,
    ];

    /// Storage index of this axis.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for roll, pitch and yaw.
    #[inline]
    pub const fn is_rotation(self) -> bool {
        matches!(self, Axis::Roll | Axis::Pitch | Axis::Yaw)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::Surge => "surge",
            Axis::Sway => "sway",
            Axis::Heave => "heave",
            Axis::Roll => "roll",
            Axis::Pitch => "pitch",
            Axis::Yaw => "yaw",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pose validation error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PoseError {
    /// A component is NaN or infinite.
    #[error("pose component {axis} is not finite ({value})")]
    NonFinite { axis: Axis, value: f64 },
}

/// Unit of the rotation components of an externally supplied pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Convert an angle in this unit to radians.
    #[inline]
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        }
    }
}

/// Desired platform position and orientation.
///
/// Translations in mm, rotations in radians (or normalized `[-1, 1]` per axis
/// when the feed reports normalized output).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(pub AxisArray);

impl Pose {
    /// The neutral pose (all components zero).
    pub const ZERO: Pose = Pose([0.0; AXIS_COUNT]);

    pub const fn new(surge: f64, sway: f64, heave: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self([surge, sway, heave, roll, pitch, yaw])
    }

    /// Pose with a single non-zero axis.
    pub fn single(axis: Axis, value: f64) -> Self {
        let mut pose = Self::ZERO;
        pose.set(axis, value);
        pose
    }

    #[inline]
    pub const fn get(&self, axis: Axis) -> f64 {
        self.0[axis as usize]
    }

    #[inline]
    pub fn set(&mut self, axis: Axis, value: f64) {
        self.0[axis.index()] = value;
    }

    #[inline]
    pub const fn surge(&self) -> f64 {
        self.0[0]
    }
    #[inline]
    pub const fn sway(&self) -> f64 {
        self.0[1]
    }
    #[inline]
    pub const fn heave(&self) -> f64 {
        self.0[2]
    }
    #[inline]
    pub const fn roll(&self) -> f64 {
        self.0[3]
    }
    #[inline]
    pub const fn pitch(&self) -> f64 {
        self.0[4]
    }
    #[inline]
    pub const fn yaw(&self) -> f64 {
        self.0[5]
    }

    /// Translation components `[surge, sway, heave]`.
    #[inline]
    pub const fn translation(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Rotation components `[roll, pitch, yaw]`.
    #[inline]
    pub const fn rotation(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Check that every component is finite.
    pub fn validate(&self) -> Result<(), PoseError> {
        for axis in Axis::ALL {
            let value = self.get(axis);
            if !value.is_finite() {
                return Err(PoseError::NonFinite { axis, value });
            }
        }
        Ok(())
    }

    /// Component-wise sum.
    pub fn offset_by(&self, other: &Pose) -> Pose {
        let mut out = *self;
        for (o, b) in out.0.iter_mut().zip(other.0.iter()) {
            *o += b;
        }
        out
    }

    /// Convert the rotation components from `unit` to radians.
    pub fn with_angle_unit(&self, unit: AngleUnit) -> Pose {
        let mut out = *self;
        for axis in [Axis::Roll, Axis::Pitch, Axis::Yaw] {
            out.set(axis, unit.to_radians(self.get(axis)));
        }
        out
    }
}

impl From<AxisArray> for Pose {
    fn from(values: AxisArray) -> Self {
        Self(values)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}, {:.4}, {:.4}, {:.4}]",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}
