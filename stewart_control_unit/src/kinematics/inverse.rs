//! Inverse kinematics.
//!
//! ```text
//! R  = Rz(yaw) · Ry(pitch) · Rx(roll)
//! t  = (surge, sway, heave + home_height)
//! Pᵢ' = R · Pᵢ + t
//! Lᵢ = ‖Pᵢ' − Bᵢ‖
//! ```
//!
//! The platform is rotated about its own origin first, then translated. All
//! angles are radians.

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion};
use stewart_common::platform::geometry::{ActuatorLengths, Geometry, Limits};
use stewart_common::platform::pose::Pose;

use super::{KinematicsError, Violations};

/// Rigid-body transform of the platform frame for `pose`.
#[inline]
pub fn platform_transform(pose: &Pose, home_height: f64) -> Isometry3<f64> {
    let rotation = Rotation3::from_euler_angles(pose.roll(), pose.pitch(), pose.yaw());
    Isometry3::from_parts(
        Translation3::new(pose.surge(), pose.sway(), pose.heave() + home_height),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

/// Actuator lengths for `pose` without any envelope check.
///
/// A non-finite pose yields non-finite lengths.
pub fn solve_unchecked(pose: &Pose, geometry: &Geometry) -> ActuatorLengths {
    let transform = platform_transform(pose, geometry.home_height());
    let mut lengths = ActuatorLengths::new();
    for (base, top) in geometry.base_points().iter().zip(geometry.platform_points()) {
        let world = transform.transform_point(&(*top).into());
        // Geometry guarantees at most MAX_ACTUATORS pairs.
        let _ = lengths.push((world.coords - base).norm());
    }
    lengths
}

/// Actuator lengths for `pose`, checked against the actuator envelope.
///
/// # Errors
/// - `NonFinite` if any pose component is NaN or infinite
/// - `OutOfEnvelope` if any length falls outside its `[min_length, max_length]`
pub fn inverse_kinematics(
    pose: &Pose,
    geometry: &Geometry,
    limits: &Limits,
) -> Result<ActuatorLengths, KinematicsError> {
    pose.validate()?;
    let lengths = solve_unchecked(pose, geometry);

    let mut violations = Violations::new();
    for (i, &len) in lengths.iter().enumerate() {
        if !limits.length_in_range(i, len) {
            let _ = violations.push(i);
        }
    }
    if violations.is_empty() {
        Ok(lengths)
    } else {
        Err(KinematicsError::OutOfEnvelope {
            lengths,
            violations,
        })
    }
}

/// Clamp every length into its actuator's bounds. Returns the number of
/// lengths changed.
pub fn clamp_to_envelope(lengths: &mut ActuatorLengths, limits: &Limits) -> usize {
    let mut changed = 0;
    for (i, len) in lengths.as_mut_slice().iter_mut().enumerate() {
        let clamped = limits.clamp_length(i, *len);
        if clamped != *len {
            *len = clamped;
            changed += 1;
        }
    }
    changed
}

/// Lengths at the neutral pose.
#[inline]
pub fn home_lengths(geometry: &Geometry) -> ActuatorLengths {
    solve_unchecked(&Pose::ZERO, geometry)
}
