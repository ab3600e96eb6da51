use std::io::Read;

use common::errors::SimError;
use common::integrators::Integrator;
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::{
    physics_sim::{vector3_from_slice, Initial, VehicleParams},
    Configuration, SimSettings,
};

pub fn load_from_file_path(path: &str) -> Result<Configuration, SimError> {
    let mut file = std::fs::File::open(path).map_err(|e| SimError::Config(format!("{path}: {e}")))?;
    let mut string = String::with_capacity(1024);
    file.read_to_string(&mut string)
        .map_err(|e| SimError::Config(format!("{path}: {e}")))?;
    load_from_str(&string)
}

pub fn load_from_str(string: &str) -> Result<Configuration, SimError> {
    let config: ToplevelConfig = toml::from_str(string).map_err(|e| SimError::Config(e.to_string()))?;
    config.try_into()
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToplevelConfig {
    #[serde(default)]
    pub simulation: SimConfig,
    #[serde(default)]
    pub initial: InitialConfig,
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

impl TryFrom<ToplevelConfig> for Configuration {
    type Error = SimError;

    fn try_from(config: ToplevelConfig) -> Result<Self, Self::Error> {
        let vehicle = config.vehicle.into_params()?;

        let initial = Initial::from_slices(
            config.initial.position.as_deref(),
            config.initial.attitude.as_deref(),
            config.initial.velocity.as_deref(),
            config.initial.angular_velocity.as_deref(),
        )?;

        let simulation = SimSettings {
            dt: config.simulation.dt,
            duration: config.simulation.duration,
        };
        simulation.validate()?;

        // Without a thrust the vehicle is commanded to hover
        let thrust = config.control.thrust.unwrap_or_else(|| vehicle.hover_thrust());
        let moments = vector3_from_slice("moments", config.control.moments.as_deref())?;

        Ok(Configuration {
            vehicle,
            initial,
            simulation,
            control: Vector4::new(thrust, moments.x, moments.y, moments.z),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Integration time step [s]
    pub dt: f64,
    /// Total simulated duration [s]
    pub duration: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        let settings = SimSettings::default();
        Self {
            dt: settings.dt,
            duration: settings.duration,
        }
    }
}

/// Configuration for initial condition of the drone within a simulation.
///
/// Any fields not defined will be initialized with zero.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialConfig {
    pub position: Option<Vec<f64>>,
    /// Roll, pitch and yaw [rad]
    pub attitude: Option<Vec<f64>>,
    pub velocity: Option<Vec<f64>>,
    pub angular_velocity: Option<Vec<f64>>,
}

/// Vehicle parameters, any field left out keeps its default value.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleConfig {
    pub gravity: Option<f64>,
    /// The total mass of the vehicle
    pub mass: Option<f64>,
    /// The angular inertia along the principal axes
    pub principal_inertia: Option<Vec<f64>>,
    /// Linear velocity drag (air resistance)
    pub lin_drag: Option<Vec<f64>>,
    pub thrust_max: Option<f64>,
    pub moment_max: Option<f64>,
    pub integrator: Option<Integrator>,
    pub singularity_margin: Option<f64>,
}

impl VehicleConfig {
    fn into_params(self) -> Result<VehicleParams, SimError> {
        let default = VehicleParams::default();

        let principal_inertia = match self.principal_inertia {
            Some(inertia) => vector3_from_slice("principal_inertia", Some(inertia.as_slice()))?,
            None => default.principal_inertia,
        };
        let lin_drag = match self.lin_drag {
            Some(drag) => vector3_from_slice("lin_drag", Some(drag.as_slice()))?,
            None => default.lin_drag,
        };

        let params = VehicleParams {
            gravity: self.gravity.unwrap_or(default.gravity),
            mass: self.mass.unwrap_or(default.mass),
            principal_inertia,
            lin_drag,
            thrust_max: self.thrust_max.unwrap_or(default.thrust_max),
            moment_max: self.moment_max.unwrap_or(default.moment_max),
            integrator: self.integrator.unwrap_or(default.integrator),
            singularity_margin: self.singularity_margin.unwrap_or(default.singularity_margin),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Constant control input. A missing thrust means hover thrust, missing moments are zero.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    pub thrust: Option<f64>,
    pub moments: Option<Vec<f64>>,
}

impl From<&Configuration> for ToplevelConfig {
    fn from(config: &Configuration) -> Self {
        let to_vec = |v: &Vector3<f64>| Some(v.as_slice().to_vec());
        ToplevelConfig {
            simulation: SimConfig {
                dt: config.simulation.dt,
                duration: config.simulation.duration,
            },
            initial: InitialConfig {
                position: to_vec(&config.initial.position),
                attitude: to_vec(&config.initial.attitude),
                velocity: to_vec(&config.initial.velocity),
                angular_velocity: to_vec(&config.initial.angular_velocity),
            },
            vehicle: VehicleConfig {
                gravity: Some(config.vehicle.gravity),
                mass: Some(config.vehicle.mass),
                principal_inertia: to_vec(&config.vehicle.principal_inertia),
                lin_drag: to_vec(&config.vehicle.lin_drag),
                thrust_max: Some(config.vehicle.thrust_max),
                moment_max: Some(config.vehicle.moment_max),
                integrator: Some(config.vehicle.integrator),
                singularity_margin: Some(config.vehicle.singularity_margin),
            },
            control: ControlConfig {
                thrust: Some(config.control[0]),
                moments: Some(config.control.fixed_rows::<3>(1).iter().copied().collect()),
            },
        }
    }
}
