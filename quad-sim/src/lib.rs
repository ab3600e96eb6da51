use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod config;
pub mod physics_sim;

use common::errors::SimError;
use nalgebra::Vector4;
use physics_sim::{Initial, QuadState, Quadrotor, VehicleParams};

/// Everything needed to set up and drive a single simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub vehicle: VehicleParams,
    pub initial: Initial,
    pub simulation: SimSettings,
    /// Constant control input `[thrust, mx, my, mz]` applied by the driver
    pub control: Vector4<f64>,
}

impl Default for Configuration {
    fn default() -> Self {
        let vehicle = VehicleParams::default();
        let control = Vector4::new(vehicle.hover_thrust(), 0.0, 0.0, 0.0);
        Self {
            vehicle,
            initial: Initial::default(),
            simulation: SimSettings::default(),
            control,
        }
    }
}

/// Timing of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSettings {
    /// Integration time step [s]
    pub dt: f64,
    /// Total simulated duration [s]
    pub duration: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            duration: 1.5,
        }
    }
}

impl SimSettings {
    pub fn validate(&self) -> Result<(), SimError> {
        SimError::check_positive("dt", self.dt)?;
        SimError::check_non_negative("duration", self.duration)
    }

    /// Number of whole steps of length `dt` needed to cover `duration`.
    pub fn steps(&self) -> u64 {
        (self.duration / self.dt).round() as u64
    }
}

struct Simulation {
    quad: Quadrotor,
    control: Vector4<f64>,
    applied: Vector4<f64>,
}

/// Shareable handle to a simulated vehicle, used to step the model from one
/// thread while reading its state from others.
///
/// Clones refer to the same vehicle, separately created handles share nothing.
#[derive(Clone)]
pub struct SimHandle(Arc<RwLock<Simulation>>);

pub trait Sim {
    fn vehicle_state(&self) -> QuadState;
    /// Set the control input used by subsequent calls to [`Sim::step`]
    fn set_control(&self, control: Vector4<f64>);
    /// The saturated control applied during the last step
    fn applied_control(&self) -> Vector4<f64>;
    fn make_upright(&self);
    fn reset_position(&self);
    fn step(&self, dt: f64) -> Result<Vector4<f64>, SimError>;
}

impl SimHandle {
    pub fn new(config: &Configuration) -> Result<Self, SimError> {
        let quad = Quadrotor::new(config.vehicle.clone(), config.initial)?;
        quad.check_attitude()?;

        Ok(Self(Arc::new(RwLock::new(Simulation {
            quad,
            control: config.control,
            applied: Vector4::zeros(),
        }))))
    }

    pub fn vehicle_params(&self) -> VehicleParams {
        self.read().quad.params().clone()
    }

    /// Human-readable summary of the current state
    pub fn dump(&self) -> String {
        self.read().quad.to_string()
    }

    // Lock poisoning is ignored, the state is plain data
    fn read(&self) -> RwLockReadGuard<'_, Simulation> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Simulation> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sim for SimHandle {
    fn vehicle_state(&self) -> QuadState {
        self.read().quad.state()
    }

    fn set_control(&self, control: Vector4<f64>) {
        self.write().control = control;
    }

    fn applied_control(&self) -> Vector4<f64> {
        self.read().applied
    }

    fn make_upright(&self) {
        self.write().quad.make_upright();
    }

    fn reset_position(&self) {
        self.write().quad.reset_position();
    }

    /// Step the vehicle with the current control input. Fails if `dt` is not
    /// positive, or if the new attitude is at the pitch singularity.
    fn step(&self, dt: f64) -> Result<Vector4<f64>, SimError> {
        SimError::check_positive("dt", dt)?;

        let mut this = self.write();
        let control = this.control;
        this.applied = this.quad.step(&control, dt);
        this.quad.check_attitude()?;

        Ok(this.applied)
    }
}

/// Create a simulation handle from the configuration.
pub fn initialize(config: &Configuration) -> Result<SimHandle, SimError> {
    config.simulation.validate()?;
    let handle = SimHandle::new(config)?;
    log::info!(
        "Initialized simulation: dt = {} s, duration = {} s, control = {:?}",
        config.simulation.dt,
        config.simulation.duration,
        config.control.as_slice()
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_handle_hover() {
        let config = Configuration::default();
        let sim = initialize(&config).unwrap();

        for _ in 0..config.simulation.steps() {
            let applied = sim.step(config.simulation.dt).unwrap();
            assert_eq!(applied, config.control);
        }

        let state = sim.vehicle_state();
        assert_eq!(state.iteration, 150);
        assert_abs_diff_eq!(state.position, Vector3::zeros(), epsilon = 1e-12);
        assert_abs_diff_eq!(state.velocity, Vector3::zeros(), epsilon = 1e-12);
        assert!(sim.dump().starts_with("Iteration 150"));
    }

    #[test]
    fn test_handle_shared_between_threads() {
        let sim = initialize(&Configuration::default()).unwrap();
        sim.set_control(Vector4::new(100.0, 0.0, 0.0, 5.0));

        let stepper = {
            let sim = sim.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    sim.step(0.01).unwrap();
                }
            })
        };
        stepper.join().unwrap();

        assert_eq!(sim.vehicle_state().iteration, 50);
        assert_eq!(sim.applied_control(), Vector4::new(40.0, 0.0, 0.0, 2.0));
        // Thrust exceeds weight, the vehicle climbs (negative z)
        assert!(sim.vehicle_state().velocity.z < 0.0);
    }

    #[test]
    fn test_handle_rejects_bad_dt() {
        let sim = initialize(&Configuration::default()).unwrap();
        assert!(matches!(sim.step(0.0), Err(SimError::InvalidParameter { name: "dt", .. })));
        assert!(sim.step(-0.01).is_err());
        assert_eq!(sim.vehicle_state().iteration, 0);
    }

    #[test]
    fn test_handle_detects_singularity() {
        let mut config = Configuration::default();
        config.initial.angular_velocity = Vector3::new(0.0, 4.0, 0.0);
        config.initial.attitude = Vector3::new(0.0, 1.5, 0.0);
        config.control = Vector4::zeros();
        let sim = initialize(&config).unwrap();

        let result = (0..100).map(|_| sim.step(0.001)).find(Result::is_err);
        assert!(matches!(result, Some(Err(SimError::AttitudeSingularity { .. }))));
    }

    #[test]
    fn test_handle_rejects_singular_start() {
        let mut config = Configuration::default();
        config.initial.attitude.y = core::f64::consts::FRAC_PI_2;
        assert!(matches!(initialize(&config), Err(SimError::AttitudeSingularity { .. })));
    }

    #[test]
    fn test_handle_upright_and_reset() {
        let mut config = Configuration::default();
        config.initial.position = Vector3::new(5.0, 0.0, -2.0);
        config.initial.attitude = Vector3::new(0.1, 0.2, 0.3);
        let sim = initialize(&config).unwrap();

        sim.make_upright();
        sim.reset_position();
        let state = sim.vehicle_state();
        assert_eq!(state.attitude, Vector3::new(0.0, 0.0, 0.3));
        assert_eq!(state.position, Vector3::zeros());
        assert_eq!(sim.vehicle_params(), VehicleParams::default());
    }

    #[test]
    fn test_settings_steps() {
        assert_eq!(SimSettings::default().steps(), 150);
        let settings = SimSettings { dt: 0.001, duration: 2.0 };
        assert_eq!(settings.steps(), 2000);
        assert!(SimSettings { dt: 0.0, duration: 1.0 }.validate().is_err());
    }
}
