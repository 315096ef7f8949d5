//! Integration test: envelope handling in the pose path.
//!
//! Validates: out-of-envelope frames never reach the driver unbounded,
//! under both envelope policies, and per-frame errors keep the previous
//! actuator command.

use stewart_common::platform::config::EnvelopePolicy;
use stewart_common::platform::pose::{Axis, Pose};
use stewart_common::platform::state::PlatformCommand;
use stewart_control_unit::context::MoveOutcome;

use super::{base_config, driven_lengths, rig};

const MIN_LENGTH: f64 = 650.0;
const MAX_LENGTH: f64 = 1250.0;

fn too_high() -> Pose {
    Pose::single(Axis::Heave, 400.0)
}

#[test]
fn hold_last_drops_frames_and_keeps_previous_command() {
    let config = base_config();
    let mut rig = rig(&config);
    rig.ctx.handle_command(PlatformCommand::Enable);

    let mut held_at = None;
    for i in 0..60 {
        match rig.ctx.handle_move(&too_high()) {
            MoveOutcome::Driven { clamped } => {
                assert!(!clamped);
                assert!(held_at.is_none(), "driven again after a held frame");
            }
            MoveOutcome::Held { violations } => {
                assert!(violations >= 1);
                let last = rig.ctx.last_lengths().clone();
                if let Some((_, first)) = &held_at {
                    assert_eq!(&last, first);
                } else {
                    held_at = Some((i, last));
                }
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    let (first_held, _) = held_at.expect("pose never left the envelope");
    assert!(first_held > 20);
    let drives = driven_lengths(&rig.driver_log);
    assert_eq!(drives.len(), first_held);
    for lengths in drives {
        assert!(lengths.iter().all(|&l| (MIN_LENGTH..=MAX_LENGTH).contains(&l)));
    }
}

#[test]
fn clamp_policy_drives_clamped_lengths() {
    let mut config = base_config();
    config.control_loop.envelope_policy = EnvelopePolicy::ClampLengths;
    let mut rig = rig(&config);
    rig.ctx.handle_command(PlatformCommand::Enable);

    let outcomes: Vec<MoveOutcome> = (0..60).map(|_| rig.ctx.handle_move(&too_high())).collect();
    assert!(outcomes.contains(&MoveOutcome::Driven { clamped: true }));
    assert!(outcomes.iter().all(|o| matches!(o, MoveOutcome::Driven { .. })));

    let drives = driven_lengths(&rig.driver_log);
    assert_eq!(drives.len(), 60);
    for lengths in &drives {
        assert!(lengths.iter().all(|&l| (MIN_LENGTH..=MAX_LENGTH).contains(&l)));
    }
    let last = drives.last().unwrap();
    assert!(last.iter().all(|&l| l == MAX_LENGTH));
}

#[test]
fn full_scale_normalized_input_stays_inside() {
    let mut config = base_config();
    config.telemetry.normalized = true;
    let mut rig = rig(&config);
    rig.ctx.handle_command(PlatformCommand::Enable);

    for target in [1.0, -1.0, 1.0] {
        for _ in 0..40 {
            let outcome = rig.ctx.handle_move(&Pose([target; 6]));
            assert_eq!(outcome, MoveOutcome::Driven { clamped: false });
        }
    }
    // Sustained full scale settles at the travel corner.
    let shaped = rig.ctx.shaped_pose();
    assert!((shaped.heave() - 80.0).abs() < 1e-6);
    assert!((shaped.yaw() - 0.2).abs() < 1e-6);
}

#[test]
fn invalid_pose_keeps_previous_command() {
    let config = base_config();
    let mut rig = rig(&config);
    rig.ctx.handle_command(PlatformCommand::Enable);

    assert_eq!(
        rig.ctx.handle_move(&Pose::single(Axis::Heave, 5.0)),
        MoveOutcome::Driven { clamped: false }
    );
    let before = rig.ctx.last_lengths().clone();
    let drives_before = driven_lengths(&rig.driver_log).len();

    assert_eq!(
        rig.ctx.handle_move(&Pose::single(Axis::Roll, f64::NAN)),
        MoveOutcome::Failed
    );
    assert_eq!(rig.ctx.last_lengths(), &before);
    assert_eq!(driven_lengths(&rig.driver_log).len(), drives_before);
    assert!(rig.ctx.is_active());

    // The next valid frame goes through.
    assert_eq!(
        rig.ctx.handle_move(&Pose::single(Axis::Heave, 8.0)),
        MoveOutcome::Driven { clamped: false }
    );
}
