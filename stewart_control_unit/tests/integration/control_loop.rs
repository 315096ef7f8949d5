//! Integration test: control loop scenarios.
//!
//! Validates: command/move ordering within a frame, state entry lengths,
//! swell auto-revert, quit/exit termination, health cadence, smoothing
//! bounds and the shutdown handshake.

use std::time::Duration;

use stewart_common::hal::driver::{ActuatorDriver, HalError, ParkPositions};
use stewart_common::hal::telemetry::{EventQueue, TelemetryClient};
use stewart_common::platform::config::{DriverConfig, MovePolicy, ScriptEntry};
use stewart_common::platform::geometry::{ActuatorLengths, Geometry, Limits};
use stewart_common::platform::health::{HealthStatus, Severity, StatusColor};
use stewart_common::platform::pose::{Axis, Pose};
use stewart_common::platform::state::{PlatformCommand, PlatformMode};
use stewart_control_unit::context::{MoveOutcome, PlatformContext};
use stewart_control_unit::cycle::CycleRunner;
use stewart_control_unit::kinematics::inverse_kinematics;
use stewart_hal::drivers::simulation::{DriverCommand, SimulationDriver};
use stewart_hal::sensors::FixedTemperatureSource;
use stewart_hal::telemetry::ScriptedTelemetry;
use stewart_hal::Recorder;

use super::{base_config, driven_lengths, rig, try_rig, HEAVE_STEP};

fn command(frame: u64, command: PlatformCommand) -> ScriptEntry {
    ScriptEntry {
        frame,
        command: Some(command),
        pose: None,
    }
}

fn pose(frame: u64, pose: Pose) -> ScriptEntry {
    ScriptEntry {
        frame,
        command: None,
        pose: Some(pose),
    }
}

// ── Ordering ────────────────────────────────────────────────────────

#[test]
fn commands_apply_before_the_frame_move() {
    let mut config = base_config();
    // Pose listed first; the enable must still win.
    config.telemetry.script = vec![
        pose(0, Pose::single(Axis::Heave, 5.0)),
        command(0, PlatformCommand::Enable),
    ];
    let mut rig = rig(&config);

    let report = rig.ctx.run_frame();
    assert_eq!(report.commands, 1);
    assert_eq!(report.mode, PlatformMode::Enabled);
    assert_eq!(report.move_outcome, Some(MoveOutcome::Driven { clamped: false }));

    let log = rig.driver_log.snapshot();
    assert!(matches!(log[0], DriverCommand::SetEnabled { enabled: true, .. }));
    assert!(matches!(log[1], DriverCommand::Drive(_)));
}

#[test]
fn moves_coalesce_to_latest_in_frame() {
    let mut config = base_config();
    config.telemetry.script = vec![
        command(0, PlatformCommand::Enable),
        pose(1, Pose::single(Axis::Heave, 100.0)),
        pose(1, Pose::single(Axis::Heave, 5.0)),
    ];
    let mut rig = rig(&config);
    rig.ctx.run_frame();
    rig.ctx.run_frame();
    assert_eq!(rig.ctx.superseded_moves(), 1);
    assert!((rig.ctx.shaped_pose().heave() - 5.0).abs() < 1e-9);
}

#[test]
fn inactive_moves_tracked_or_skipped_per_policy() {
    let mut config = base_config();
    config.telemetry.script = vec![pose(0, Pose::single(Axis::Heave, 5.0))];

    let mut tracking = rig(&config);
    let report = tracking.ctx.run_frame();
    assert_eq!(report.move_outcome, Some(MoveOutcome::Tracked));
    assert!(driven_lengths(&tracking.driver_log).is_empty());

    config.control_loop.move_policy = MovePolicy::SkipWhileInactive;
    let mut skipping = rig(&config);
    let report = skipping.ctx.run_frame();
    assert_eq!(report.move_outcome, Some(MoveOutcome::Skipped));
    assert_eq!(skipping.ctx.shaped_pose(), Pose::ZERO);
}

// ── State entry ─────────────────────────────────────────────────────

#[test]
fn idle_entry_uses_lengths_of_current_pose() {
    let current = Pose::new(10.0, -5.0, 30.0, 0.02, -0.01, 0.05);
    let mut config = base_config();
    config.telemetry.script = vec![pose(0, current), command(1, PlatformCommand::Idle)];
    let mut rig = rig(&config);
    rig.ctx.run_frame();
    rig.ctx.run_frame();
    assert_eq!(rig.ctx.mode(), PlatformMode::Idle);

    let expected = inverse_kinematics(&current, rig.ctx.geometry(), rig.ctx.limits()).unwrap();
    match rig.driver_log.last() {
        Some(DriverCommand::MoveToIdle(lengths)) => assert_eq!(lengths, expected),
        other => panic!("expected MoveToIdle, got {other:?}"),
    }
    assert_eq!(rig.ctx.last_lengths(), &expected);

    // The driver parks at the idle pose; the context keeps the entry lengths.
    let park =
        inverse_kinematics(&config.poses.idle, rig.ctx.geometry(), rig.ctx.limits()).unwrap();
    assert_ne!(rig.ctx.last_lengths(), &park);
}

#[test]
fn normalized_entry_lengths_scale_by_travel() {
    let mut config = base_config();
    config.telemetry.normalized = true;
    config.telemetry.script = vec![
        pose(0, Pose::single(Axis::Heave, 0.5)),
        command(1, PlatformCommand::Ready),
    ];
    let mut rig = rig(&config);
    rig.ctx.run_frame();
    rig.ctx.run_frame();

    let physical = Pose::single(Axis::Heave, 40.0);
    let expected = inverse_kinematics(&physical, rig.ctx.geometry(), rig.ctx.limits()).unwrap();
    assert_eq!(rig.driver_log.last(), Some(DriverCommand::MoveToReady(expected)));
}

#[test]
fn disable_from_every_mode() {
    let setups: [&[PlatformCommand]; 5] = [
        &[],
        &[PlatformCommand::Idle],
        &[PlatformCommand::Ready],
        &[PlatformCommand::Enable],
        &[PlatformCommand::Ready, PlatformCommand::SwellForStairs],
    ];
    for setup in setups {
        let mut rig = rig(&base_config());
        for &c in setup {
            rig.ctx.handle_command(c);
        }
        rig.ctx.handle_command(PlatformCommand::Disable);
        assert_eq!(rig.ctx.mode(), PlatformMode::Disabled, "after {setup:?}");
        assert!(matches!(
            rig.driver_log.last(),
            Some(DriverCommand::SetEnabled { enabled: false, .. })
        ));

        // The dwell is gone: nothing reverts later.
        for _ in 0..20 {
            rig.ctx.run_frame();
        }
        assert_eq!(rig.ctx.mode(), PlatformMode::Disabled);
    }
}

// ── Swell ───────────────────────────────────────────────────────────

#[test]
fn swell_reverts_to_prior_mode_after_dwell() {
    let mut config = base_config();
    config.telemetry.script = vec![
        command(0, PlatformCommand::Ready),
        command(1, PlatformCommand::SwellForStairs),
    ];
    let mut rig = rig(&config);

    // 0.5 s at 20 Hz = 10 frames of dwell, counted from frame 2.
    let modes: Vec<PlatformMode> = (0..13).map(|_| rig.ctx.run_frame().mode).collect();
    assert_eq!(modes[0], PlatformMode::Ready);
    assert!(modes[1..=10].iter().all(|&m| m == PlatformMode::Swell));
    assert_eq!(modes[11], PlatformMode::Ready);
    assert_eq!(modes[12], PlatformMode::Ready);
    assert!(rig
        .driver_log
        .snapshot()
        .contains(&DriverCommand::Swell(Duration::from_millis(500))));
}

#[test]
fn repeated_swell_restarts_dwell() {
    let mut config = base_config();
    config.telemetry.script = vec![
        command(0, PlatformCommand::Enable),
        command(1, PlatformCommand::SwellForStairs),
        command(6, PlatformCommand::SwellForStairs),
    ];
    let mut rig = rig(&config);
    let modes: Vec<PlatformMode> = (0..18).map(|_| rig.ctx.run_frame().mode).collect();
    assert!(modes[1..=15].iter().all(|&m| m == PlatformMode::Swell));
    assert_eq!(modes[16], PlatformMode::Enabled);
}

// ── Termination ─────────────────────────────────────────────────────

fn fast_config() -> stewart_common::platform::config::PlatformConfig {
    let mut config = base_config();
    config.control_loop.frame_rate_hz = 1000.0;
    config
}

#[test]
fn exit_stops_loop_and_shuts_down() {
    let mut config = fast_config();
    config.telemetry.script = vec![command(3, PlatformCommand::Exit)];
    let rig = rig(&config);
    let log = rig.driver_log.clone();

    let mut runner = CycleRunner::new(rig.ctx, Some(1000));
    runner.run().unwrap();
    assert_eq!(runner.stats().cycle_count, 4);
    assert!(!runner.context().is_active());
    assert_eq!(log.last(), Some(DriverCommand::Shutdown));
}

#[test]
fn unconfirmed_quit_keeps_running() {
    let mut config = fast_config();
    config.telemetry.confirm_quit = false;
    config.telemetry.script = vec![command(1, PlatformCommand::Quit)];
    let rig = rig(&config);

    let mut runner = CycleRunner::new(rig.ctx, Some(10));
    runner.run().unwrap();
    assert_eq!(runner.stats().cycle_count, 10);
}

#[test]
fn confirmed_quit_stops_loop() {
    let mut config = fast_config();
    config.telemetry.script = vec![command(2, PlatformCommand::Quit)];
    let rig = rig(&config);

    let mut runner = CycleRunner::new(rig.ctx, Some(1000));
    runner.run().unwrap();
    assert_eq!(runner.stats().cycle_count, 3);
}

#[test]
fn cleared_flag_stops_before_next_frame() {
    let rig = rig(&fast_config());
    let flag = rig.ctx.active_flag();
    let mut runner = CycleRunner::new(rig.ctx, Some(1000));
    runner.step();
    flag.store(false, std::sync::atomic::Ordering::SeqCst);
    assert!(!runner.should_continue());
    runner.run().unwrap();
    assert_eq!(runner.stats().cycle_count, 0);
}

// ── Health ──────────────────────────────────────────────────────────

#[test]
fn health_reported_every_interval_from_frame_zero() {
    let mut config = base_config();
    config.control_loop.health_interval_frames = Some(5);
    let mut rig = try_rig(&config, [55.0, 50.0]).unwrap();

    let sampled: Vec<u64> = (0..12)
        .filter_map(|_| {
            let report = rig.ctx.run_frame();
            report.health.map(|_| report.frame)
        })
        .collect();
    assert_eq!(sampled, vec![0, 5, 10]);

    let statuses = rig.statuses.snapshot();
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].severity, Severity::Warn);
    assert_eq!(statuses[0].color, StatusColor::Orange);
    assert_eq!(statuses[0].readings, [55.0, 50.0]);
}

#[test]
fn default_health_interval_is_one_second() {
    let mut rig = rig(&base_config());
    for _ in 0..41 {
        rig.ctx.run_frame();
    }
    // Frames 0, 20 and 40 at 20 Hz.
    assert_eq!(rig.statuses.len(), 3);
    assert_eq!(rig.statuses.last().map(|s| s.severity), Some(Severity::Ok));
}

// ── Smoothing through the loop ──────────────────────────────────────

#[test]
fn step_input_is_rate_bounded_per_frame() {
    let mut config = base_config();
    config.telemetry.script = vec![
        command(0, PlatformCommand::Enable),
        pose(1, Pose::single(Axis::Heave, 60.0)),
    ];
    // Hold the request for the following frames.
    for frame in 2..12 {
        config.telemetry.script.push(pose(frame, Pose::single(Axis::Heave, 60.0)));
    }
    let mut rig = rig(&config);

    let mut previous = 0.0;
    for _ in 0..12 {
        rig.ctx.run_frame();
        let heave = rig.ctx.shaped_pose().heave();
        assert!((heave - previous).abs() <= HEAVE_STEP + 1e-9);
        previous = heave;
    }
    assert!((previous - 60.0).abs() < 1e-9);
}

#[test]
fn washout_returns_sustained_input_to_neutral() {
    let mut config = base_config();
    config.telemetry.normalized = true;
    config.shape.washout_tc[Axis::Surge.index()] = 0.5;
    config.telemetry.script = vec![command(0, PlatformCommand::Enable)];
    for frame in 1..200 {
        config.telemetry.script.push(pose(frame, Pose::single(Axis::Surge, 1.0)));
    }
    let mut rig = rig(&config);

    let surge: Vec<f64> = (0..200)
        .map(|_| {
            rig.ctx.run_frame();
            rig.ctx.shaped_pose().surge()
        })
        .collect();
    let peak = surge.iter().cloned().fold(f64::MIN, f64::max);
    assert!(peak > 40.0, "transient passed at {peak}");
    assert!(surge[199].abs() < 1.0, "sustained input washed out to {}", surge[199]);
}

#[test]
fn long_enabled_session_keeps_driver_log_bounded() {
    let mut rig = rig(&base_config());
    rig.ctx.handle_command(PlatformCommand::Enable);
    let cap = rig.driver_log.capacity();
    for _ in 0..(cap + 200) {
        let outcome = rig.ctx.handle_move(&Pose::single(Axis::Heave, 5.0));
        assert!(matches!(outcome, MoveOutcome::Driven { .. }));
    }
    assert_eq!(rig.driver_log.len(), cap);
    assert!(matches!(rig.driver_log.last(), Some(DriverCommand::Drive(_))));
}

// ── Shutdown handshake ──────────────────────────────────────────────

/// Telemetry client that records its shutdown into a shared log.
struct ProbeTelemetry {
    order: Recorder<&'static str>,
    fail: bool,
}

impl TelemetryClient for ProbeTelemetry {
    fn name(&self) -> &'static str {
        "probe"
    }
    fn begin(&mut self, _limits: &Limits) -> Result<(), HalError> {
        Ok(())
    }
    fn service(&mut self, _events: &mut EventQueue) {}
    fn current_pose(&self) -> Pose {
        Pose::ZERO
    }
    fn is_normalized(&self) -> bool {
        false
    }
    fn report_status(&mut self, _status: &HealthStatus) {}
    fn shutdown(&mut self) -> Result<(), HalError> {
        self.order.push("telemetry");
        if self.fail {
            Err(HalError::CommunicationError("link down".into()))
        } else {
            Ok(())
        }
    }
}

/// Simulation driver that records its shutdown into a shared log.
struct ProbeDriver {
    inner: SimulationDriver,
    order: Recorder<&'static str>,
}

impl ActuatorDriver for ProbeDriver {
    fn name(&self) -> &'static str {
        "probe"
    }
    fn platform_name(&self) -> &str {
        self.inner.platform_name()
    }
    fn init(&mut self, config: &DriverConfig) -> Result<(), HalError> {
        self.inner.init(config)
    }
    fn geometry(&self) -> Result<Geometry, HalError> {
        self.inner.geometry()
    }
    fn limits(&self) -> Result<Limits, HalError> {
        self.inner.limits()
    }
    fn set_park_positions(&mut self, park: &ParkPositions) {
        self.inner.set_park_positions(park);
    }
    fn set_enabled(&mut self, enabled: bool, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.inner.set_enabled(enabled, lengths)
    }
    fn move_to_idle(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.inner.move_to_idle(lengths)
    }
    fn move_to_ready(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.inner.move_to_ready(lengths)
    }
    fn swell(&mut self, duration: Duration) -> Result<(), HalError> {
        self.inner.swell(duration)
    }
    fn drive(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.inner.drive(lengths)
    }
    fn shutdown(&mut self) -> Result<(), HalError> {
        self.order.push("driver");
        self.inner.shutdown()
    }
}

fn probe_context(fail_telemetry: bool) -> (PlatformContext, Recorder<&'static str>) {
    let config = base_config();
    let order = Recorder::new();
    let ctx = PlatformContext::new(
        &config,
        Box::new(ProbeDriver {
            inner: SimulationDriver::new(),
            order: order.clone(),
        }),
        Box::new(ProbeTelemetry {
            order: order.clone(),
            fail: fail_telemetry,
        }),
        Box::new(FixedTemperatureSource::new([30.0, 30.0])),
    )
    .unwrap();
    (ctx, order)
}

#[test]
fn shutdown_runs_telemetry_then_driver() {
    let (mut ctx, order) = probe_context(false);
    ctx.shutdown().unwrap();
    assert_eq!(order.snapshot(), vec!["telemetry", "driver"]);
}

#[test]
fn driver_shutdown_attempted_when_telemetry_fails() {
    let (mut ctx, order) = probe_context(true);
    let result = ctx.shutdown();
    assert!(matches!(result, Err(HalError::CommunicationError(_))));
    assert_eq!(order.snapshot(), vec!["telemetry", "driver"]);
}

#[test]
fn scripted_client_runs_whole_session() {
    let mut config = fast_config();
    config.telemetry.script = vec![
        command(0, PlatformCommand::Ready),
        command(2, PlatformCommand::Enable),
        pose(3, Pose::single(Axis::Heave, 5.0)),
        command(5, PlatformCommand::Idle),
        command(7, PlatformCommand::Exit),
    ];
    let telemetry = ScriptedTelemetry::new(&config.telemetry);
    let driver = SimulationDriver::new();
    let log = driver.command_log();
    let ctx = PlatformContext::new(
        &config,
        Box::new(driver),
        Box::new(telemetry),
        Box::new(FixedTemperatureSource::new([30.0, 30.0])),
    )
    .unwrap();

    let mut runner = CycleRunner::new(ctx, None);
    runner.run().unwrap();
    assert_eq!(runner.stats().cycle_count, 8);
    assert_eq!(runner.stats().moves_driven, 1);
    assert_eq!(runner.context().mode(), PlatformMode::Idle);

    let kinds: Vec<&str> = log
        .snapshot()
        .iter()
        .map(|c| match c {
            DriverCommand::SetEnabled { .. } => "enable",
            DriverCommand::MoveToIdle(_) => "idle",
            DriverCommand::MoveToReady(_) => "ready",
            DriverCommand::Swell(_) => "swell",
            DriverCommand::Drive(_) => "drive",
            DriverCommand::Shutdown => "shutdown",
        })
        .collect();
    assert_eq!(kinds, vec!["ready", "enable", "drive", "idle", "shutdown"]);
}
