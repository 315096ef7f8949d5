//! Integration test: startup sequence.
//!
//! Validates: config loading → driver init → rig cross checks → park
//! positions → telemetry start. Every failure here is fatal.

use std::io::Write;
use std::path::Path;

use stewart_common::hal::driver::HalError;
use stewart_common::platform::pose::Pose;
use stewart_common::platform::state::PlatformMode;
use stewart_control_unit::config::{load_config, LoadError};
use stewart_control_unit::context::{PlatformContext, StartupError};
use stewart_control_unit::kinematics::home_lengths;
use stewart_hal::DriverRegistry;
use tempfile::NamedTempFile;

use super::{assert_hal_err, base_config, try_rig, PLATFORM_TOML};

#[test]
fn config_file_to_running_context() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PLATFORM_TOML.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();

    let registry = DriverRegistry::with_builtin();
    let ctx = PlatformContext::from_config(&config, &registry).unwrap();
    assert_eq!(ctx.mode(), PlatformMode::Disabled);
    assert_eq!(ctx.platform_name(), "Integration rig");
    assert_eq!(ctx.geometry().actuator_count(), 6);
    assert!(ctx.is_active());
    assert_eq!(ctx.frame(), 0);
    assert_eq!(ctx.last_lengths(), &home_lengths(ctx.geometry()));
    for &l in ctx.last_lengths().iter() {
        assert!((l - 934.0069).abs() < 1e-3);
    }
}

#[test]
fn shipped_sample_config_starts() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/platform.toml");
    let config = load_config(&path).unwrap();
    let registry = DriverRegistry::with_builtin();
    let ctx = PlatformContext::from_config(&config, &registry).unwrap();
    assert_eq!(ctx.mode(), PlatformMode::Disabled);
}

#[test]
fn unknown_driver_is_fatal() {
    let mut config = base_config();
    config.driver.name = "ethercat".into();
    let registry = DriverRegistry::with_builtin();
    let result = PlatformContext::from_config(&config, &registry);
    assert!(matches!(
        result,
        Err(StartupError::Hal(HalError::DriverNotFound(_)))
    ));
}

#[test]
fn unknown_telemetry_kind_is_fatal() {
    let mut config = base_config();
    config.telemetry.kind = "udp".into();
    let registry = DriverRegistry::with_builtin();
    assert!(matches!(
        PlatformContext::from_config(&config, &registry),
        Err(StartupError::Hal(HalError::DriverNotFound(_)))
    ));
}

#[test]
fn degenerate_geometry_is_fatal() {
    let mut config = base_config();
    config.driver.geometry.platform[1] = config.driver.geometry.platform[0];
    let err = assert_hal_err(try_rig(&config, [30.0, 30.0]));
    assert!(matches!(err, HalError::ConfigError(_)));
}

#[test]
fn max_rate_above_rig_velocity_is_fatal() {
    let mut config = base_config();
    config.shape.max_rate[2] = 1000.0;
    match try_rig(&config, [30.0, 30.0]) {
        Err(StartupError::Config(LoadError::ValidationError(msg))) => {
            assert!(msg.contains("max_rate[2]"), "{msg}");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected startup failure"),
    }
}

#[test]
fn fixed_pose_outside_envelope_is_fatal() {
    let mut config = base_config();
    config.poses.swell = Pose::new(0.0, 0.0, 500.0, 0.0, 0.0, 0.0);
    match try_rig(&config, [30.0, 30.0]) {
        Err(StartupError::Config(LoadError::PoseOutOfEnvelope { name, .. })) => {
            assert_eq!(name, "swell");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected startup failure"),
    }
}

#[test]
fn oversized_swell_duration_is_fatal() {
    let mut config = base_config();
    config.poses.swell_duration_s = 1e20;
    match try_rig(&config, [30.0, 30.0]) {
        Err(StartupError::Config(LoadError::ValidationError(msg))) => {
            assert!(msg.contains("swell_duration_s"), "{msg}");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected startup failure"),
    }
}
