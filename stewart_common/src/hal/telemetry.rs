//! Telemetry client interface and the serialized event entry points.
//!
//! A telemetry client never touches shaping or state machine memory. During
//! `service()` it only reports what arrived through [`EventQueue`]: commands
//! via `push_command`, pose requests via `push_move`. The control loop then
//! drains commands first (in arrival order) and afterwards processes at most
//! one pose request, the latest one of the frame.

use crate::hal::driver::HalError;
use crate::platform::geometry::Limits;
use crate::platform::health::HealthStatus;
use crate::platform::pose::Pose;
use crate::platform::state::PlatformCommand;

/// Events reported by a telemetry client during one frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    commands: Vec<PlatformCommand>,
    pending_move: Option<Pose>,
    superseded_moves: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(8),
            pending_move: None,
            superseded_moves: 0,
        }
    }

    /// Command entry point.
    pub fn push_command(&mut self, command: PlatformCommand) {
        self.commands.push(command);
    }

    /// Pose-move entry point. A later move in the same frame replaces an
    /// earlier one.
    pub fn push_move(&mut self, pose: Pose) {
        if self.pending_move.replace(pose).is_some() {
            self.superseded_moves += 1;
        }
    }

    /// Commands in arrival order, emptying the command list.
    pub fn drain_commands(&mut self) -> std::vec::Drain<'_, PlatformCommand> {
        self.commands.drain(..)
    }

    /// The latest pose request of the frame, if any.
    pub fn take_move(&mut self) -> Option<Pose> {
        self.pending_move.take()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.pending_move.is_none()
    }

    /// Number of pose requests replaced by a newer one before processing.
    #[inline]
    pub fn superseded_moves(&self) -> u64 {
        self.superseded_moves
    }
}

/// Interface to the simulation telemetry feed.
pub trait TelemetryClient: Send {
    /// Client identifier (e.g. "scripted").
    fn name(&self) -> &'static str;

    /// Start the client with the rig limits.
    fn begin(&mut self, limits: &Limits) -> Result<(), HalError>;

    /// Pump internal I/O once per frame, reporting into `events`.
    fn service(&mut self, events: &mut EventQueue);

    /// Current best-known pose.
    fn current_pose(&self) -> Pose;

    /// Poses are normalized `[-1, 1]` per axis rather than physical units.
    fn is_normalized(&self) -> bool;

    /// Status line sink.
    fn report_status(&mut self, status: &HealthStatus);

    /// Ask the operator to confirm a `quit`.
    ///
    /// Default: confirmed (no interactive surface).
    fn confirm_quit(&mut self) -> bool {
        true
    }

    fn shutdown(&mut self) -> Result<(), HalError>;
}
