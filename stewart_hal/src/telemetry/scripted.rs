//! Scripted telemetry client.
//!
//! Replays `[[telemetry.script]]` entries: at frame `N` each matching entry
//! reports its command and/or pose. A reported pose also becomes the
//! client's current pose. Frames are counted by `service()` calls, so frame 0
//! is the first frame of the control loop.

use stewart_common::hal::driver::HalError;
use stewart_common::hal::telemetry::{EventQueue, TelemetryClient};
use stewart_common::platform::config::{ScriptEntry, TelemetryConfig};
use stewart_common::platform::geometry::Limits;
use stewart_common::platform::health::HealthStatus;
use stewart_common::platform::pose::Pose;
use tracing::{debug, info};

use crate::recorder::Recorder;

pub struct ScriptedTelemetry {
    script: Vec<ScriptEntry>,
    cursor: usize,
    frame: u64,
    normalized: bool,
    confirm_quit: bool,
    current_pose: Pose,
    statuses: Recorder<HealthStatus>,
    started: bool,
}

impl ScriptedTelemetry {
    pub fn new(config: &TelemetryConfig) -> Self {
        let mut script = config.script.clone();
        // Stable: entries sharing a frame keep their file order.
        script.sort_by_key(|e| e.frame);
        Self {
            script,
            cursor: 0,
            frame: 0,
            normalized: config.normalized,
            confirm_quit: config.confirm_quit,
            current_pose: Pose::ZERO,
            statuses: Recorder::new(),
            started: false,
        }
    }

    /// Handle to the reported statuses.
    pub fn status_log(&self) -> Recorder<HealthStatus> {
        self.statuses.clone()
    }

    /// All script entries have been replayed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.script.len()
    }

    /// Frames serviced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl TelemetryClient for ScriptedTelemetry {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn begin(&mut self, limits: &Limits) -> Result<(), HalError> {
        info!(
            "Scripted telemetry started: {} entries, {} input, travel {:?}",
            self.script.len(),
            if self.normalized { "normalized" } else { "physical" },
            limits.travel
        );
        self.started = true;
        Ok(())
    }

    fn service(&mut self, events: &mut EventQueue) {
        if !self.started {
            return;
        }
        while let Some(entry) = self.script.get(self.cursor) {
            if entry.frame > self.frame {
                break;
            }
            if let Some(command) = entry.command {
                debug!("frame {}: command {}", self.frame, command);
                events.push_command(command);
            }
            if let Some(pose) = entry.pose {
                self.current_pose = pose;
                events.push_move(pose);
            }
            self.cursor += 1;
        }
        self.frame += 1;
    }

    fn current_pose(&self) -> Pose {
        self.current_pose
    }

    fn is_normalized(&self) -> bool {
        self.normalized
    }

    fn report_status(&mut self, status: &HealthStatus) {
        self.statuses.push(*status);
    }

    fn confirm_quit(&mut self) -> bool {
        info!("Quit requested, confirmed={}", self.confirm_quit);
        self.confirm_quit
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Scripted telemetry stopped after {} frames", self.frame);
        self.started = false;
        Ok(())
    }
}
