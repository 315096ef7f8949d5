//! Actuator ("muscle") projection for display and diagnostics.
//!
//! Pure function of a pose and its lengths; never feeds back into control.

use nalgebra::Point3;
use stewart_common::consts::MAX_ACTUATORS;
use stewart_common::platform::geometry::{ActuatorLengths, Geometry, Limits};
use stewart_common::platform::pose::Pose;

use super::inverse::platform_transform;

/// One actuator in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Muscle {
    /// Base attachment point [mm].
    pub base: Point3<f64>,
    /// Platform attachment point after the pose transform [mm].
    pub top: Point3<f64>,
    /// Commanded length [mm].
    pub length: f64,
    /// Extension within `[min_length, max_length]`, 0..=100.
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuscleProjection {
    pub muscles: heapless::Vec<Muscle, MAX_ACTUATORS>,
}

impl std::fmt::Display for MuscleProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, m) in self.muscles.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{i}:{:.0}%", m.percent)?;
        }
        Ok(())
    }
}

/// Project the actuators for `pose` with the given `lengths`.
///
/// Percent extension is clamped to `0..=100`, so an out-of-envelope length
/// shows as fully retracted or fully extended.
pub fn project_muscles(
    pose: &Pose,
    lengths: &ActuatorLengths,
    geometry: &Geometry,
    limits: &Limits,
) -> MuscleProjection {
    let transform = platform_transform(pose, geometry.home_height());
    let mut projection = MuscleProjection::default();
    for (i, ((base, top), &length)) in geometry
        .base_points()
        .iter()
        .zip(geometry.platform_points())
        .zip(lengths.iter())
        .enumerate()
    {
        let span = limits.max_length[i] - limits.min_length[i];
        let percent = ((length - limits.min_length[i]) / span * 100.0).clamp(0.0, 100.0);
        let _ = projection.muscles.push(Muscle {
            base: Point3::from(*base),
            top: transform.transform_point(&Point3::from(*top)),
            length,
            percent,
        });
    }
    projection
}
