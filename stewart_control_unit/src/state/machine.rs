//! Platform mode transitions.
//!
//! Disabled (initial) ⇄ Idle ⇄ Ready ⇄ Enabled, any → Swell → prior mode.
//!
//! Every non-terminal command is accepted from every mode, including the
//! mode the platform is already in; the entry command is re-issued so the
//! driver moves from wherever the platform currently sits. While in Swell,
//! `swellForStairs` restarts the dwell and keeps the remembered prior mode;
//! any other mode command cancels the dwell. `quit` and `exit` end the loop
//! without a mode change.

use stewart_common::platform::state::{PlatformCommand, PlatformMode};

use super::swell::SwellTimer;

/// Actuator command issued on entering a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// `set_enabled(bool, lengths)`.
    SetEnabled(bool),
    /// `move_to_idle(lengths)`.
    MoveToIdle,
    /// `move_to_ready(lengths)`.
    MoveToReady,
    /// `swell(duration)`.
    Swell,
}

/// Result of handling one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Mode entered; the loop issues `action` to the driver.
    Entered {
        from: PlatformMode,
        to: PlatformMode,
        action: EntryAction,
    },
    /// `swellForStairs` while already in Swell: dwell restarted.
    SwellRestarted,
    /// `quit` (`confirm = true`) or `exit` (`confirm = false`).
    Terminate { confirm: bool },
}

/// Platform mode owner.
#[derive(Debug, Clone)]
pub struct PlatformStateMachine {
    mode: PlatformMode,
    /// Mode to return to when the swell dwell expires.
    prior: PlatformMode,
    swell: SwellTimer,
}

impl PlatformStateMachine {
    /// State machine in Disabled with a swell dwell of `swell_frames`.
    pub const fn new(swell_frames: u32) -> Self {
        Self {
            mode: PlatformMode::Disabled,
            prior: PlatformMode::Disabled,
            swell: SwellTimer::new(swell_frames),
        }
    }

    /// Current mode.
    #[inline]
    pub const fn mode(&self) -> PlatformMode {
        self.mode
    }

    /// Mode the platform returns to after the swell (meaningful in Swell).
    #[inline]
    pub const fn prior_mode(&self) -> PlatformMode {
        self.prior
    }

    #[inline]
    pub const fn swell_remaining(&self) -> u32 {
        self.swell.remaining()
    }

    pub fn handle_command(&mut self, command: PlatformCommand) -> TransitionOutcome {
        use PlatformCommand::*;

        let (to, action) = match command {
            Quit => return TransitionOutcome::Terminate { confirm: true },
            Exit => return TransitionOutcome::Terminate { confirm: false },

            SwellForStairs if self.mode == PlatformMode::Swell => {
                self.swell.start();
                return TransitionOutcome::SwellRestarted;
            }
            SwellForStairs => {
                self.prior = self.mode;
                self.swell.start();
                (PlatformMode::Swell, EntryAction::Swell)
            }

            Enable => (PlatformMode::Enabled, EntryAction::SetEnabled(true)),
            Disable => (PlatformMode::Disabled, EntryAction::SetEnabled(false)),
            Idle => (PlatformMode::Idle, EntryAction::MoveToIdle),
            Ready => (PlatformMode::Ready, EntryAction::MoveToReady),
        };

        if to != PlatformMode::Swell {
            self.swell.cancel();
        }
        let from = self.mode;
        self.mode = to;
        TransitionOutcome::Entered { from, to, action }
    }

    /// Count one frame of swell dwell.
    ///
    /// Returns the restored mode on the frame the dwell expires.
    pub fn tick(&mut self) -> Option<PlatformMode> {
        if self.mode == PlatformMode::Swell && self.swell.tick() {
            self.mode = self.prior;
            return Some(self.mode);
        }
        None
    }
}
