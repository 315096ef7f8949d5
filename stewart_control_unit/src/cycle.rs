//! Fixed-rate control loop.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Pacing
//! Frames are paced against absolute deadlines on a monotonic clock
//! (`clock_nanosleep(TIMER_ABSTIME)` with `rt`, `Instant` otherwise), so
//! processing time does not accumulate as drift. A frame that runs past its
//! deadline is counted as an overrun; the schedule then resynchronizes to
//! the current time instead of bursting to catch up.
//!
//! ## Termination
//! The loop checks the active flag at every frame boundary. Once it is
//! cleared (`quit`, `exit`, signal) or the frame limit is reached, the
//! shutdown handshake runs: telemetry first, then the driver.

use stewart_common::hal::driver::HalError;
use tracing::{debug, info, warn};

use crate::context::{FrameReport, MoveOutcome, PlatformContext};

/// Overruns logged individually before switching to periodic summaries.
const OVERRUN_LOG_BURST: u64 = 5;
/// Summary period for overruns beyond the burst.
const OVERRUN_LOG_EVERY: u64 = 100;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-frame timing and outcome statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total frames executed.
    pub cycle_count: u64,
    /// Last frame processing time [ns].
    pub last_cycle_ns: i64,
    /// Minimum frame processing time [ns].
    pub min_cycle_ns: i64,
    /// Maximum frame processing time [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Running sum of squares for stddev computation.
    pub sum_sq_cycle_ns: i128,
    /// Frames that ran past their deadline.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between expected and actual wake).
    pub max_latency_ns: i64,
    /// Pose requests sent to the driver.
    pub moves_driven: u64,
    /// Frames dropped because the pose left the envelope.
    pub dropped_frames: u64,
    /// Frames driven with clamped actuator lengths.
    pub clamped_frames: u64,
    /// Frames whose pose request failed (invalid input, driver error).
    pub frame_errors: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            sum_sq_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
            moves_driven: 0,
            dropped_frames: 0,
            clamped_frames: 0,
            frame_errors: 0,
        }
    }

    /// Record a frame duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
        self.sum_sq_cycle_ns += (duration_ns as i128) * (duration_ns as i128);
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Count the pose outcome of one frame.
    #[inline]
    pub fn record_report(&mut self, report: &FrameReport) {
        match report.move_outcome {
            Some(MoveOutcome::Driven { clamped }) => {
                self.moves_driven += 1;
                if clamped {
                    self.clamped_frames += 1;
                }
            }
            Some(MoveOutcome::Held { .. }) => self.dropped_frames += 1,
            Some(MoveOutcome::Failed) => self.frame_errors += 1,
            Some(MoveOutcome::Tracked | MoveOutcome::Skipped) | None => {}
        }
    }

    /// Average frame processing time [ns] (0 if no frames).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }

    /// Standard deviation of the frame processing time [ns].
    pub fn stddev_cycle_ns(&self) -> f64 {
        if self.cycle_count < 2 {
            return 0.0;
        }
        let n = self.cycle_count as f64;
        let mean = self.sum_cycle_ns as f64 / n;
        let var = self.sum_sq_cycle_ns as f64 / n - mean * mean;
        var.max(0.0).sqrt()
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup or loop teardown.
#[derive(Debug)]
pub enum CycleError {
    /// RT system call failed.
    RtSetup(String),
    /// Shutdown handshake failed.
    Shutdown(HalError),
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RtSetup(msg) => write!(f, "RT setup error: {msg}"),
            Self::Shutdown(e) => write!(f, "shutdown failed: {e}"),
        }
    }
}

impl std::error::Error for CycleError {}

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{mlockall, MlockallFlags};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop never faults on it.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the full RT setup sequence before entering the loop.
///
/// Without the `rt` feature every step is a no-op.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the context and paces [`PlatformContext::run_frame`].
pub struct CycleRunner {
    ctx: PlatformContext,
    stats: CycleStats,
    /// Frame interval [ns].
    cycle_time_ns: i64,
    /// Stop after this many frames (`None` = until the active flag clears).
    max_frames: Option<u64>,
}

impl CycleRunner {
    pub fn new(ctx: PlatformContext, max_frames: Option<u64>) -> Self {
        let cycle_time_ns = ctx.frame_interval().as_nanos() as i64;
        Self {
            ctx,
            stats: CycleStats::new(),
            cycle_time_ns,
            max_frames,
        }
    }

    /// Run the loop until termination, then perform the shutdown handshake.
    ///
    /// # Errors
    /// `CycleError::RtSetup` if the clock cannot be read (`rt` only),
    /// `CycleError::Shutdown` if a collaborator fails to shut down.
    pub fn run(&mut self) -> Result<(), CycleError> {
        info!(
            "Control loop started: {} ns frames{}",
            self.cycle_time_ns,
            match self.max_frames {
                Some(n) => format!(", limit {n}"),
                None => String::new(),
            }
        );

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop();
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop();

        info!(
            "Control loop stopped after {} frames: avg {} ns, max {} ns, {} overruns, \
             {} driven, {} dropped, {} clamped, {} errors",
            self.stats.cycle_count,
            self.stats.avg_cycle_ns(),
            self.stats.max_cycle_ns,
            self.stats.overruns,
            self.stats.moves_driven,
            self.stats.dropped_frames,
            self.stats.clamped_frames,
            self.stats.frame_errors
        );

        let shutdown = self.ctx.shutdown().map_err(CycleError::Shutdown);
        result.and(shutdown)
    }

    /// Run one frame without pacing.
    pub fn step(&mut self) -> FrameReport {
        let report = self.ctx.run_frame();
        self.stats.record_report(&report);
        report
    }

    /// Whether another frame should run.
    #[inline]
    pub fn should_continue(&self) -> bool {
        self.ctx.is_active() && self.max_frames.is_none_or(|max| self.ctx.frame() < max)
    }

    /// Frame body with timing.
    #[inline]
    fn timed_step(&mut self, latency_ns: i64, elapsed_ns: impl FnOnce() -> i64) {
        let report = self.step();
        let duration_ns = elapsed_ns();
        self.stats.record(duration_ns, latency_ns);
        if !report.active {
            debug!("Active flag cleared in frame {}", report.frame);
        }
    }

    fn note_overrun(&mut self, late_ns: i64) {
        self.stats.overruns += 1;
        let n = self.stats.overruns;
        if n <= OVERRUN_LOG_BURST || n % OVERRUN_LOG_EVERY == 0 {
            warn!(
                "Frame {} overran its deadline by {} us ({n} overruns so far)",
                self.ctx.frame(),
                late_ns / 1000
            );
        }
    }

    /// RT loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self) -> Result<(), CycleError> {
        use nix::time::{clock_gettime, clock_nanosleep, ClockId, ClockNanosleepFlags};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || {
            clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))
        };
        let mut deadline = now()?;

        while self.should_continue() {
            let start = now()?;
            let latency_ns = timespec_diff_ns(&start, &deadline).max(0);
            deadline = timespec_add_ns(deadline, self.cycle_time_ns);

            self.timed_step(latency_ns, || {
                clock_gettime(clock)
                    .map(|end| timespec_diff_ns(&end, &start))
                    .unwrap_or(0)
            });

            let end = now()?;
            let late_ns = timespec_diff_ns(&end, &deadline);
            if late_ns > 0 {
                self.note_overrun(late_ns);
                deadline = end;
                continue;
            }
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &deadline);
        }
        Ok(())
    }

    /// Loop using `Instant` deadlines and `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self) -> Result<(), CycleError> {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.cycle_time_ns as u64);
        let mut deadline = Instant::now();

        while self.should_continue() {
            let start = Instant::now();
            let latency_ns = start.saturating_duration_since(deadline).as_nanos() as i64;
            deadline += period;

            self.timed_step(latency_ns, || start.elapsed().as_nanos() as i64);

            let now = Instant::now();
            if now > deadline {
                self.note_overrun(now.duration_since(deadline).as_nanos() as i64);
                deadline = now;
                continue;
            }
            std::thread::sleep(deadline - now);
        }
        Ok(())
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn context(&self) -> &PlatformContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut PlatformContext {
        &mut self.ctx
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
