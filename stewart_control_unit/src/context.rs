//! Application context: every long-lived collaborator plus the active flag.
//!
//! [`PlatformContext`] is the single writer of shaping state and platform
//! mode. One call to [`run_frame`](PlatformContext::run_frame) is one
//! control-loop tick:
//!
//! 1. count the swell dwell
//! 2. service the telemetry client (it reports into the [`EventQueue`])
//! 3. apply all reported commands, in arrival order
//! 4. apply the latest reported pose request, if any
//! 5. sample health on the configured sub-multiple of the frame rate
//! 6. advance the driver by one frame

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stewart_common::hal::driver::{ActuatorDriver, HalError, ParkPositions};
use stewart_common::hal::sensor::TemperatureSource;
use stewart_common::hal::telemetry::{EventQueue, TelemetryClient};
use stewart_common::platform::config::{EnvelopePolicy, MovePolicy, PlatformConfig, UnitsConfig};
use stewart_common::platform::geometry::{ActuatorLengths, Geometry, Limits};
use stewart_common::platform::health::HealthStatus;
use stewart_common::platform::pose::Pose;
use stewart_common::platform::state::{PlatformCommand, PlatformMode};
use stewart_hal::DriverRegistry;
use tracing::{debug, info, trace, warn};

use crate::config::{travel_corners_outside, validate_against_rig, LoadError};
use crate::health::HealthMonitor;
use crate::kinematics::{
    clamp_to_envelope, home_lengths, inverse_kinematics, project_muscles, KinematicsError,
};
use crate::shaping::{ShapeError, ShapingPipeline};
use crate::state::machine::{EntryAction, PlatformStateMachine, TransitionOutcome};
use crate::state::swell::dwell_frames;

// ─── Startup Error ──────────────────────────────────────────────────

/// Fatal error before the loop starts.
#[derive(Debug)]
pub enum StartupError {
    /// Driver, telemetry client or registry failure.
    Hal(HalError),
    /// Configuration inconsistent with the rig.
    Config(LoadError),
    /// Shaping could not be initialized.
    Shape(ShapeError),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hal(e) => write!(f, "collaborator startup failed: {e}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Shape(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<HalError> for StartupError {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

impl From<LoadError> for StartupError {
    fn from(e: LoadError) -> Self {
        Self::Config(e)
    }
}

impl From<ShapeError> for StartupError {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}

// ─── Frame Report ───────────────────────────────────────────────────

/// What happened to the pose request of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Sent to the driver (`clamped` under `EnvelopePolicy::ClampLengths`).
    Driven { clamped: bool },
    /// Shaped and solved but not forwarded (platform not Enabled).
    Tracked,
    /// Ignored (platform not Enabled, `MovePolicy::SkipWhileInactive`).
    Skipped,
    /// Out of envelope; previous actuator command kept.
    Held { violations: usize },
    /// Per-frame error, logged; previous actuator command kept.
    Failed,
}

/// Summary of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Mode at the end of the frame.
    pub mode: PlatformMode,
    pub commands: u32,
    pub move_outcome: Option<MoveOutcome>,
    pub health: Option<HealthStatus>,
    /// Active flag at the end of the frame.
    pub active: bool,
}

// ─── Context ────────────────────────────────────────────────────────

/// Long-lived state of the controller, owned by the control loop.
pub struct PlatformContext {
    telemetry: Box<dyn TelemetryClient>,
    driver: Box<dyn ActuatorDriver>,
    health: HealthMonitor,
    geometry: Geometry,
    limits: Limits,
    pipeline: ShapingPipeline,
    machine: PlatformStateMachine,
    events: EventQueue,
    /// Shared with the signal handler only.
    active: Arc<AtomicBool>,

    units: UnitsConfig,
    move_policy: MovePolicy,
    envelope_policy: EnvelopePolicy,
    log_muscles: bool,
    health_interval: u64,
    frame_dt: Duration,
    swell_duration: Duration,

    /// Lengths last handed to the driver: the per-frame `drive` command, or
    /// the starting lengths of a state-entry command. A park move then runs
    /// to the driver's own park position, which is not tracked here.
    last_lengths: ActuatorLengths,
    frame: u64,
}

impl PlatformContext {
    /// Build the context from configuration and the built-in collaborators.
    pub fn from_config(
        config: &PlatformConfig,
        registry: &DriverRegistry,
    ) -> Result<Self, StartupError> {
        let driver = registry.create_driver(&config.driver.name)?;
        let telemetry = stewart_hal::telemetry::create_client(&config.telemetry)?;
        let source = stewart_hal::sensors::create_source(&config.health.source);
        Self::new(config, driver, telemetry, source)
    }

    /// Initialize the collaborators and all controller state.
    ///
    /// # Errors
    /// Any failure here is fatal: geometry or limits unavailable, shaping
    /// inconsistent with the limits, a fixed pose outside the envelope, or a
    /// collaborator refusing to start.
    pub fn new(
        config: &PlatformConfig,
        mut driver: Box<dyn ActuatorDriver>,
        mut telemetry: Box<dyn TelemetryClient>,
        source: Box<dyn TemperatureSource>,
    ) -> Result<Self, StartupError> {
        driver.init(&config.driver)?;
        let geometry = driver.geometry()?;
        let limits = driver.limits()?;
        limits
            .validate(geometry.actuator_count())
            .map_err(|e| LoadError::ValidationError(format!("driver limits: {e}")))?;
        validate_against_rig(config, &geometry, &limits)?;

        let outside = travel_corners_outside(&config.poses.home, &geometry, &limits);
        if outside > 0 {
            warn!(
                "{outside} of 64 travel corners leave the actuator envelope, \
                 {:?} applies to those frames",
                config.control_loop.envelope_policy
            );
        }

        let frame_interval = config.control_loop.frame_interval();
        let pipeline =
            ShapingPipeline::new(&config.shape, &limits, config.poses.home, frame_interval)?;

        let park_lengths = |name: &'static str, pose: &Pose| {
            inverse_kinematics(pose, &geometry, &limits)
                .map_err(|source| LoadError::PoseOutOfEnvelope { name, source })
        };
        let park = ParkPositions {
            idle: park_lengths("idle", &config.poses.idle)?,
            ready: park_lengths("ready", &config.poses.ready)?,
            swell: park_lengths("swell", &config.poses.swell)?,
        };
        driver.set_park_positions(&park);

        telemetry.begin(&limits)?;

        let swell_frames = dwell_frames(config.poses.swell_duration_s, frame_interval);
        let last_lengths = home_lengths(&geometry);

        info!(
            "Platform '{}': {} actuators, home lengths {}, {:.1} Hz, swell {} frames",
            driver.platform_name(),
            geometry.actuator_count(),
            last_lengths,
            config.control_loop.frame_rate_hz,
            swell_frames
        );
        debug!(
            "Policies: move={:?}, envelope={:?}, angles={:?}, euler={:?}",
            config.control_loop.move_policy,
            config.control_loop.envelope_policy,
            config.units.angles,
            config.units.euler_order
        );

        Ok(Self {
            telemetry,
            driver,
            health: HealthMonitor::new(source, config.health.bands),
            geometry,
            limits,
            pipeline,
            machine: PlatformStateMachine::new(swell_frames),
            events: EventQueue::new(),
            active: Arc::new(AtomicBool::new(true)),
            units: config.units,
            move_policy: config.control_loop.move_policy,
            envelope_policy: config.control_loop.envelope_policy,
            log_muscles: config.control_loop.log_muscles,
            health_interval: config.control_loop.health_interval(),
            frame_dt: Duration::from_secs_f64(frame_interval),
            swell_duration: Duration::from_secs_f64(config.poses.swell_duration_s),
            last_lengths,
            frame: 0,
        })
    }

    // ─── Frame ──────────────────────────────────────────────────────

    /// Execute one control-loop tick.
    pub fn run_frame(&mut self) -> FrameReport {
        let frame = self.frame;

        if let Some(mode) = self.machine.tick() {
            info!("Swell dwell complete, platform back to {mode}");
        }

        self.telemetry.service(&mut self.events);

        // Commands first, so a stale move never overrides a transition.
        let mut events = std::mem::take(&mut self.events);
        let mut commands = 0;
        for command in events.drain_commands() {
            self.handle_command(command);
            commands += 1;
        }
        let move_outcome = events.take_move().map(|pose| self.handle_move(&pose));
        self.events = events;

        let health = (frame % self.health_interval == 0).then(|| self.sample_health());

        self.driver.cycle(self.frame_dt);
        self.frame += 1;

        FrameReport {
            frame,
            mode: self.machine.mode(),
            commands,
            move_outcome,
            health,
            active: self.is_active(),
        }
    }

    /// Apply one command: state transition plus its actuator entry command.
    pub fn handle_command(&mut self, command: PlatformCommand) {
        match self.machine.handle_command(command) {
            TransitionOutcome::Terminate { confirm } => {
                if confirm && !self.telemetry.confirm_quit() {
                    info!("'{command}' not confirmed, continuing");
                    return;
                }
                info!("'{command}' received, stopping control loop");
                self.active.store(false, Ordering::SeqCst);
            }
            TransitionOutcome::SwellRestarted => {
                info!("Swell dwell restarted");
                if let Err(e) = self.driver.swell(self.swell_duration) {
                    warn!("Driver swell failed: {e}");
                }
            }
            TransitionOutcome::Entered { from, to, action } => {
                info!("Platform {from} -> {to} ('{command}')");
                let (pose, lengths) = self.entry_lengths();
                if to == PlatformMode::Enabled {
                    // Shaping resumes from where the platform sits.
                    self.pipeline.reset(&pose);
                }
                let result = match action {
                    EntryAction::SetEnabled(enabled) => self.driver.set_enabled(enabled, &lengths),
                    EntryAction::MoveToIdle => self.driver.move_to_idle(&lengths),
                    EntryAction::MoveToReady => self.driver.move_to_ready(&lengths),
                    EntryAction::Swell => self.driver.swell(self.swell_duration),
                };
                match result {
                    // The driver owns the swell lengths.
                    Ok(()) if action != EntryAction::Swell => self.last_lengths = lengths,
                    Ok(()) => {}
                    Err(e) => warn!("Driver entry command for {to} failed: {e}"),
                }
            }
        }
    }

    /// Apply one pose request.
    ///
    /// Never fails: errors are logged and the previous actuator command stays.
    pub fn handle_move(&mut self, request: &Pose) -> MoveOutcome {
        let forwarding = self.machine.mode().forwards_motion();
        if !forwarding && self.move_policy == MovePolicy::SkipWhileInactive {
            return MoveOutcome::Skipped;
        }

        let normalized = self.telemetry.is_normalized();
        let request = self.intake(request, normalized);
        let shaped = match self.pipeline.process(&request, normalized) {
            Ok(pose) => pose,
            Err(e) => {
                warn!("Frame {}: move rejected: {e}", self.frame);
                return MoveOutcome::Failed;
            }
        };
        let flags = self.pipeline.flags();
        if !flags.is_empty() {
            trace!(
                "Frame {}: saturated={:?} rate={:?} accel={:?}",
                self.frame, flags.saturated, flags.rate_limited, flags.accel_limited
            );
        }

        let (lengths, clamped) = match inverse_kinematics(&shaped, &self.geometry, &self.limits) {
            Ok(lengths) => (lengths, false),
            Err(KinematicsError::OutOfEnvelope {
                mut lengths,
                violations,
            }) => match self.envelope_policy {
                EnvelopePolicy::HoldLast => {
                    warn!(
                        "Frame {}: pose {shaped} out of envelope (actuators {:?}), frame dropped",
                        self.frame,
                        violations.as_slice()
                    );
                    return MoveOutcome::Held {
                        violations: violations.len(),
                    };
                }
                EnvelopePolicy::ClampLengths => {
                    warn!(
                        "Frame {}: pose {shaped} out of envelope (actuators {:?}), clamped",
                        self.frame,
                        violations.as_slice()
                    );
                    clamp_to_envelope(&mut lengths, &self.limits);
                    (lengths, true)
                }
            },
            Err(e) => {
                warn!("Frame {}: {e}", self.frame);
                return MoveOutcome::Failed;
            }
        };

        if self.log_muscles {
            trace!(
                "Muscles: {}",
                project_muscles(&shaped, &lengths, &self.geometry, &self.limits)
            );
        }

        if !forwarding {
            return MoveOutcome::Tracked;
        }
        match self.driver.drive(&lengths) {
            Ok(()) => {
                self.last_lengths = lengths;
                MoveOutcome::Driven { clamped }
            }
            Err(e) => {
                warn!("Frame {}: drive failed: {e}", self.frame);
                MoveOutcome::Failed
            }
        }
    }

    /// Sample health and push the status to the telemetry client.
    pub fn sample_health(&mut self) -> HealthStatus {
        let status = self.health.sample();
        self.telemetry.report_status(&status);
        status
    }

    /// Shutdown handshake: telemetry first, then the driver.
    ///
    /// Both are attempted; the first error is returned.
    pub fn shutdown(&mut self) -> Result<(), HalError> {
        self.active.store(false, Ordering::SeqCst);
        info!("Shutting down after {} frames in {}", self.frame, self.machine.mode());
        let telemetry = self.telemetry.shutdown();
        if let Err(e) = &telemetry {
            warn!("Telemetry shutdown failed: {e}");
        }
        let driver = self.driver.shutdown();
        if let Err(e) = &driver {
            warn!("Driver shutdown failed: {e}");
        }
        telemetry.and(driver)
    }

    // ─── Helpers ────────────────────────────────────────────────────

    /// Physical requests may carry degrees; everything downstream is radians.
    #[inline]
    fn intake(&self, pose: &Pose, normalized: bool) -> Pose {
        if normalized {
            *pose
        } else {
            pose.with_angle_unit(self.units.angles)
        }
    }

    /// Lengths for the current telemetry pose, used by state-entry commands.
    ///
    /// Out-of-envelope lengths are clamped; an invalid pose falls back to the
    /// last commanded lengths.
    fn entry_lengths(&self) -> (Pose, ActuatorLengths) {
        let normalized = self.telemetry.is_normalized();
        let current = self.intake(&self.telemetry.current_pose(), normalized);
        let pose = self.pipeline.to_physical(&current, normalized);
        match inverse_kinematics(&pose, &self.geometry, &self.limits) {
            Ok(lengths) => (pose, lengths),
            Err(KinematicsError::OutOfEnvelope {
                mut lengths,
                violations,
            }) => {
                warn!(
                    "Current pose {pose} out of envelope (actuators {:?}), clamping entry lengths",
                    violations.as_slice()
                );
                clamp_to_envelope(&mut lengths, &self.limits);
                (pose, lengths)
            }
            Err(e) => {
                warn!("Current pose unusable ({e}), reusing last commanded lengths");
                (self.pipeline.output(), self.last_lengths.clone())
            }
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> PlatformMode {
        self.machine.mode()
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Handle for the signal handler; clearing it stops the loop at the next
    /// frame boundary.
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    pub fn platform_name(&self) -> &str {
        self.driver.platform_name()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Last smoothed pose.
    pub fn shaped_pose(&self) -> Pose {
        self.pipeline.output()
    }

    /// Lengths last handed to the driver (see the field docs).
    pub fn last_lengths(&self) -> &ActuatorLengths {
        &self.last_lengths
    }

    #[inline]
    pub fn frame_interval(&self) -> Duration {
        self.frame_dt
    }

    /// Pose requests replaced by a newer one within the same frame.
    pub fn superseded_moves(&self) -> u64 {
        self.events.superseded_moves()
    }
}
