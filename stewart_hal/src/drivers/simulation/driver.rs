//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `ActuatorDriver` trait with
//! slew-rate limited actuators, park moves to the configured fixed
//! positions, and a swell dwell that returns to the pre-swell lengths on its
//! own. Every command is appended to a shared log.

use std::time::Duration;

use stewart_common::hal::driver::{ActuatorDriver, HalError, ParkPositions};
use stewart_common::platform::config::DriverConfig;
use stewart_common::platform::geometry::{ActuatorLengths, Geometry, Limits};
use tracing::{debug, info, warn};

use super::physics::ActuatorSimulator;
use crate::recorder::Recorder;

/// Command received by the simulation driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCommand {
    SetEnabled {
        enabled: bool,
        lengths: ActuatorLengths,
    },
    MoveToIdle(ActuatorLengths),
    MoveToReady(ActuatorLengths),
    Swell(Duration),
    Drive(ActuatorLengths),
    Shutdown,
}

/// Pending swell return.
#[derive(Debug, Clone)]
struct SwellDwell {
    remaining: Duration,
    return_to: ActuatorLengths,
}

/// Simulation driver implementing the ActuatorDriver trait.
pub struct SimulationDriver {
    name: &'static str,
    platform_name: String,
    initialized: bool,
    enabled: bool,
    geometry: Option<Geometry>,
    limits: Option<Limits>,
    /// One simulator per actuator
    actuators: Vec<ActuatorSimulator>,
    park: ParkPositions,
    swell: Option<SwellDwell>,
    log: Recorder<DriverCommand>,
}

impl SimulationDriver {
    /// Create a new, uninitialized simulation driver.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            platform_name: String::new(),
            initialized: false,
            enabled: false,
            geometry: None,
            limits: None,
            actuators: Vec::new(),
            park: ParkPositions::default(),
            swell: None,
            log: Recorder::new(),
        }
    }

    /// Handle to the command log.
    pub fn command_log(&self) -> Recorder<DriverCommand> {
        self.log.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_swelling(&self) -> bool {
        self.swell.is_some()
    }

    /// Current simulated actuator lengths.
    pub fn lengths(&self) -> ActuatorLengths {
        self.collect(ActuatorSimulator::length)
    }

    /// Commanded actuator lengths.
    pub fn targets(&self) -> ActuatorLengths {
        self.collect(ActuatorSimulator::target)
    }

    /// All actuators within the settle window of their target.
    pub fn is_settled(&self) -> bool {
        self.actuators.iter().all(ActuatorSimulator::is_settled)
    }

    fn collect(&self, f: fn(&ActuatorSimulator) -> f64) -> ActuatorLengths {
        let mut out = ActuatorLengths::new();
        for act in &self.actuators {
            // Actuator count was checked against capacity at init.
            let _ = out.push(f(act));
        }
        out
    }

    fn ensure_initialized(&self) -> Result<(), HalError> {
        if self.initialized {
            Ok(())
        } else {
            Err(HalError::InitFailed("simulation driver not initialized".into()))
        }
    }

    fn check_count(&self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        if lengths.len() != self.actuators.len() {
            return Err(HalError::CommunicationError(format!(
                "expected {} actuator lengths, got {}",
                self.actuators.len(),
                lengths.len()
            )));
        }
        Ok(())
    }

    fn set_targets(&mut self, lengths: &[f64]) {
        for (act, &len) in self.actuators.iter_mut().zip(lengths) {
            act.set_target(len);
        }
    }

    /// Move from `from` to the `park` position, or hold `from` when no park
    /// position is configured.
    fn park_move(&mut self, from: &ActuatorLengths, park: ActuatorLengths) -> Result<(), HalError> {
        self.ensure_initialized()?;
        self.check_count(from)?;
        self.swell = None;
        if park.is_empty() {
            self.set_targets(from);
        } else {
            self.set_targets(&park);
        }
        Ok(())
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn platform_name(&self) -> &str {
        &self.platform_name
    }

    fn init(&mut self, config: &DriverConfig) -> Result<(), HalError> {
        let geometry = Geometry::from_config(&config.geometry)
            .map_err(|e| HalError::ConfigError(format!("geometry: {e}")))?;
        let limits = config.limits.clone();
        limits
            .validate(geometry.actuator_count())
            .map_err(|e| HalError::ConfigError(e.to_string()))?;
        if !(config.actuator_speed.is_finite() && config.actuator_speed > 0.0) {
            return Err(HalError::ConfigError(format!(
                "actuator_speed {} must be positive",
                config.actuator_speed
            )));
        }

        info!(
            "Initializing simulation driver for '{}' with {} actuators, speed {:.0} mm/s",
            config.platform_name,
            geometry.actuator_count(),
            config.actuator_speed
        );

        // Unpowered actuators rest fully retracted.
        self.actuators = (0..geometry.actuator_count())
            .map(|i| {
                ActuatorSimulator::new(
                    i,
                    limits.min_length[i],
                    config.actuator_speed,
                    limits.min_length[i],
                    limits.max_length[i],
                )
            })
            .collect();
        self.platform_name = config.platform_name.clone();
        self.geometry = Some(geometry);
        self.limits = Some(limits);
        self.enabled = false;
        self.swell = None;
        self.initialized = true;
        Ok(())
    }

    fn geometry(&self) -> Result<Geometry, HalError> {
        self.geometry
            .clone()
            .ok_or_else(|| HalError::InitFailed("geometry not loaded".into()))
    }

    fn limits(&self) -> Result<Limits, HalError> {
        self.limits
            .clone()
            .ok_or_else(|| HalError::InitFailed("limits not loaded".into()))
    }

    fn set_park_positions(&mut self, park: &ParkPositions) {
        debug!(
            "Park positions: idle={} ready={} swell={}",
            park.idle, park.ready, park.swell
        );
        self.park = park.clone();
    }

    fn set_enabled(&mut self, enabled: bool, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.ensure_initialized()?;
        self.check_count(lengths)?;
        self.log.push(DriverCommand::SetEnabled {
            enabled,
            lengths: lengths.clone(),
        });
        self.swell = None;
        self.enabled = enabled;
        if enabled {
            self.set_targets(lengths);
        } else {
            self.actuators.iter_mut().for_each(ActuatorSimulator::hold);
        }
        info!("Actuators {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    fn move_to_idle(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.log.push(DriverCommand::MoveToIdle(lengths.clone()));
        self.park_move(lengths, self.park.idle.clone())
    }

    fn move_to_ready(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.log.push(DriverCommand::MoveToReady(lengths.clone()));
        self.park_move(lengths, self.park.ready.clone())
    }

    fn swell(&mut self, duration: Duration) -> Result<(), HalError> {
        self.ensure_initialized()?;
        self.log.push(DriverCommand::Swell(duration));

        // A repeated swell keeps the original return position.
        let return_to = match self.swell.take() {
            Some(dwell) => dwell.return_to,
            None => self.targets(),
        };
        if !self.park.swell.is_empty() {
            let swell = self.park.swell.clone();
            self.set_targets(&swell);
        }
        debug!("Swell for {:?}, returning to {}", duration, return_to);
        self.swell = Some(SwellDwell {
            remaining: duration,
            return_to,
        });
        Ok(())
    }

    fn drive(&mut self, lengths: &ActuatorLengths) -> Result<(), HalError> {
        self.ensure_initialized()?;
        self.check_count(lengths)?;
        if !self.enabled {
            return Err(HalError::NotEnabled);
        }
        self.log.push(DriverCommand::Drive(lengths.clone()));
        self.swell = None;
        self.set_targets(lengths);
        Ok(())
    }

    fn cycle(&mut self, dt: Duration) {
        if let Some(dwell) = self.swell.as_mut() {
            dwell.remaining = dwell.remaining.saturating_sub(dt);
            if dwell.remaining.is_zero() {
                let return_to = dwell.return_to.clone();
                self.swell = None;
                self.set_targets(&return_to);
                info!("Swell dwell complete, returning to {}", return_to);
            }
        }

        let dt_s = dt.as_secs_f64();
        for act in &mut self.actuators {
            act.update(dt_s);
        }
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        self.log.push(DriverCommand::Shutdown);
        if self.enabled {
            warn!("Shutdown while enabled, holding actuators");
        }
        self.actuators.iter_mut().for_each(ActuatorSimulator::hold);
        self.enabled = false;
        self.swell = None;
        info!("Simulation driver shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stewart_common::platform::geometry::GeometryConfig;

    fn config() -> DriverConfig {
        let geometry = Geometry::hexapod(1000.0, 600.0, 20.0, 800.0).unwrap();
        DriverConfig {
            name: "simulation".into(),
            platform_name: "Test chair".into(),
            geometry: geometry.to_config(),
            limits: Limits::uniform(
                6,
                650.0,
                1250.0,
                [80.0, 80.0, 80.0, 0.15, 0.15, 0.2],
                [400.0, 400.0, 400.0, 1.0, 1.0, 1.0],
            ),
            actuator_speed: 400.0,
        }
    }

    fn driver() -> SimulationDriver {
        let mut d = SimulationDriver::new();
        d.init(&config()).unwrap();
        d
    }

    fn lengths(v: f64) -> ActuatorLengths {
        ActuatorLengths::uniform(6, v).unwrap()
    }

    const FRAME: Duration = Duration::from_millis(50);

    #[test]
    fn init_loads_geometry_and_limits() {
        let d = driver();
        assert_eq!(d.platform_name(), "Test chair");
        assert_eq!(d.geometry().unwrap().actuator_count(), 6);
        assert_eq!(d.limits().unwrap().max_length[0], 1250.0);
        assert_eq!(d.lengths(), lengths(650.0));
    }

    #[test]
    fn init_rejects_bad_geometry() {
        let mut cfg = config();
        cfg.geometry = GeometryConfig {
            base: vec![[0.0, 0.0, 0.0]; 6],
            ..cfg.geometry
        };
        let mut d = SimulationDriver::new();
        assert!(matches!(d.init(&cfg), Err(HalError::ConfigError(_))));
        assert!(d.geometry().is_err());
    }

    #[test]
    fn drive_refused_when_disabled() {
        let mut d = driver();
        assert!(matches!(d.drive(&lengths(900.0)), Err(HalError::NotEnabled)));
        d.set_enabled(true, &lengths(900.0)).unwrap();
        assert!(d.drive(&lengths(950.0)).is_ok());
        assert_eq!(d.targets(), lengths(950.0));
    }

    #[test]
    fn drive_rejects_wrong_count() {
        let mut d = driver();
        d.set_enabled(true, &lengths(900.0)).unwrap();
        let short = ActuatorLengths::uniform(5, 900.0).unwrap();
        assert!(matches!(d.drive(&short), Err(HalError::CommunicationError(_))));
    }

    #[test]
    fn cycle_slews_toward_target() {
        let mut d = driver();
        d.set_enabled(true, &lengths(700.0)).unwrap();
        d.cycle(FRAME);
        assert!((d.lengths()[0] - 670.0).abs() < 1e-9);
        for _ in 0..5 {
            d.cycle(FRAME);
        }
        assert!(d.is_settled());
        assert_eq!(d.lengths(), lengths(700.0));
    }

    #[test]
    fn idle_uses_park_position_when_set() {
        let mut d = driver();
        d.move_to_idle(&lengths(900.0)).unwrap();
        assert_eq!(d.targets(), lengths(900.0));

        d.set_park_positions(&ParkPositions {
            idle: lengths(700.0),
            ready: lengths(950.0),
            swell: lengths(1100.0),
        });
        d.move_to_idle(&lengths(900.0)).unwrap();
        assert_eq!(d.targets(), lengths(700.0));
        d.move_to_ready(&lengths(900.0)).unwrap();
        assert_eq!(d.targets(), lengths(950.0));
    }

    #[test]
    fn swell_returns_after_dwell() {
        let mut d = driver();
        d.set_park_positions(&ParkPositions {
            idle: lengths(700.0),
            ready: lengths(950.0),
            swell: lengths(1100.0),
        });
        d.move_to_ready(&lengths(900.0)).unwrap();
        d.swell(Duration::from_millis(200)).unwrap();
        assert!(d.is_swelling());
        assert_eq!(d.targets(), lengths(1100.0));

        for _ in 0..3 {
            d.cycle(FRAME);
        }
        assert!(d.is_swelling());
        d.cycle(FRAME);
        assert!(!d.is_swelling());
        assert_eq!(d.targets(), lengths(950.0));
    }

    #[test]
    fn repeated_swell_keeps_return_position() {
        let mut d = driver();
        d.set_park_positions(&ParkPositions {
            idle: lengths(700.0),
            ready: lengths(950.0),
            swell: lengths(1100.0),
        });
        d.move_to_ready(&lengths(900.0)).unwrap();
        d.swell(FRAME).unwrap();
        d.swell(FRAME).unwrap();
        d.cycle(FRAME);
        assert_eq!(d.targets(), lengths(950.0));
    }

    #[test]
    fn command_log_records_in_order() {
        let mut d = driver();
        let log = d.command_log();
        d.set_enabled(true, &lengths(900.0)).unwrap();
        d.drive(&lengths(910.0)).unwrap();
        d.shutdown().unwrap();
        let entries = log.snapshot();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], DriverCommand::SetEnabled { enabled: true, .. }));
        assert_eq!(entries[1], DriverCommand::Drive(lengths(910.0)));
        assert_eq!(entries[2], DriverCommand::Shutdown);
        assert!(!d.is_enabled());
    }
}
