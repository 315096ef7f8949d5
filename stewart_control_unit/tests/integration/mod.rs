//! Shared fixtures for the integration scenarios.

mod control_loop;
mod envelope;
mod startup;

use stewart_common::hal::driver::HalError;
use stewart_common::platform::config::PlatformConfig;
use stewart_common::platform::health::{HealthStatus, SensorReadings};
use stewart_control_unit::config::load_config_from_str;
use stewart_control_unit::context::{PlatformContext, StartupError};
use stewart_hal::drivers::simulation::{DriverCommand, SimulationDriver};
use stewart_hal::sensors::FixedTemperatureSource;
use stewart_hal::telemetry::ScriptedTelemetry;
use stewart_hal::Recorder;

/// Hexapod rig: base radius 1000 mm, platform radius 600 mm, 20° pair
/// spacing, 800 mm home height. Home actuator length is about 934 mm.
pub const PLATFORM_TOML: &str = r#"
[shared]
service_name = "stewart-it"

[loop]
frame_rate_hz = 20.0

[shape]
max_rate = [200.0, 200.0, 200.0, 0.5, 0.5, 0.5]

[poses]
idle = [0.0, 0.0, -100.0, 0.0, 0.0, 0.0]
ready = [0.0, 0.0, -40.0, 0.0, 0.0, 0.0]
swell = [0.0, 0.0, 150.0, 0.0, 0.0, 0.0]
swell_duration_s = 0.5

[health]
source = { kind = "fixed", readings = [30.0, 30.0] }

[driver]
name = "simulation"
platform_name = "Integration rig"
actuator_speed = 400.0

[driver.geometry]
home_height = 800.0
base = [
    [1000.0, 0.0, 0.0],
    [500.0, 866.025404, 0.0],
    [-500.0, 866.025404, 0.0],
    [-1000.0, 0.0, 0.0],
    [-500.0, -866.025404, 0.0],
    [500.0, -866.025404, 0.0],
]
platform = [
    [563.815572, 205.212086, 0.0],
    [459.626666, 385.672566, 0.0],
    [-459.626666, 385.672566, 0.0],
    [-563.815572, 205.212086, 0.0],
    [-104.188907, -590.884652, 0.0],
    [104.188907, -590.884652, 0.0],
]

[driver.limits]
min_length = [650.0, 650.0, 650.0, 650.0, 650.0, 650.0]
max_length = [1250.0, 1250.0, 1250.0, 1250.0, 1250.0, 1250.0]
travel = [80.0, 80.0, 80.0, 0.15, 0.15, 0.2]
max_velocity = [400.0, 400.0, 400.0, 1.0, 1.0, 1.0]

[telemetry]
kind = "scripted"
normalized = false
"#;

/// Per-frame heave bound at 200 mm/s and 20 Hz.
pub const HEAVE_STEP: f64 = 10.0;

pub fn base_config() -> PlatformConfig {
    load_config_from_str(PLATFORM_TOML).unwrap()
}

/// Context plus handles onto what its collaborators saw.
pub struct Rig {
    pub ctx: PlatformContext,
    pub driver_log: Recorder<DriverCommand>,
    pub statuses: Recorder<HealthStatus>,
}

pub fn try_rig(config: &PlatformConfig, readings: SensorReadings) -> Result<Rig, StartupError> {
    let driver = SimulationDriver::new();
    let driver_log = driver.command_log();
    let telemetry = ScriptedTelemetry::new(&config.telemetry);
    let statuses = telemetry.status_log();
    let ctx = PlatformContext::new(
        config,
        Box::new(driver),
        Box::new(telemetry),
        Box::new(FixedTemperatureSource::new(readings)),
    )?;
    Ok(Rig {
        ctx,
        driver_log,
        statuses,
    })
}

pub fn rig(config: &PlatformConfig) -> Rig {
    try_rig(config, [30.0, 30.0]).unwrap()
}

/// Lengths of every `Drive` command in the log.
pub fn driven_lengths(log: &Recorder<DriverCommand>) -> Vec<Vec<f64>> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            DriverCommand::Drive(l) => Some(l.to_vec()),
            _ => None,
        })
        .collect()
}

pub fn assert_hal_err(result: Result<Rig, StartupError>) -> HalError {
    match result {
        Err(StartupError::Hal(e)) => e,
        Err(other) => panic!("expected HAL error, got {other}"),
        Ok(_) => panic!("expected startup failure"),
    }
}
