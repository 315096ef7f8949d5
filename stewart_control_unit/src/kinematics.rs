//! Kinematics engine.
//!
//! Stateless mapping from a [`Pose`](stewart_common::platform::pose::Pose) to
//! actuator lengths for a given rig.
//!
//! - [`inverse`] - pose → lengths, with envelope check
//! - [`muscles`] - display-only projection of the actuators in world space

pub mod inverse;
pub mod muscles;

pub use inverse::{
    clamp_to_envelope, home_lengths, inverse_kinematics, platform_transform, solve_unchecked,
};
pub use muscles::{project_muscles, Muscle, MuscleProjection};

use stewart_common::consts::MAX_ACTUATORS;
use stewart_common::platform::geometry::ActuatorLengths;
use stewart_common::platform::pose::PoseError;

/// Indices of actuators outside their length bounds.
pub type Violations = heapless::Vec<usize, MAX_ACTUATORS>;

/// Kinematics failure.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Pose has a NaN or infinite component.
    NonFinite(PoseError),
    /// At least one actuator length is outside `[min_length, max_length]`.
    ///
    /// Carries the computed lengths so the caller can decide to clamp.
    OutOfEnvelope {
        lengths: ActuatorLengths,
        violations: Violations,
    },
}

impl std::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(e) => write!(f, "invalid pose: {e}"),
            Self::OutOfEnvelope {
                lengths,
                violations,
            } => write!(
                f,
                "out of envelope: actuators {:?} outside limits, lengths {lengths}",
                violations.as_slice()
            ),
        }
    }
}

impl std::error::Error for KinematicsError {}

impl From<PoseError> for KinematicsError {
    fn from(e: PoseError) -> Self {
        Self::NonFinite(e)
    }
}
