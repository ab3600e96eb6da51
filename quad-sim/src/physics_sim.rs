use core::f64::consts::TAU;
use core::fmt;

use common::consts;
use common::errors::SimError;
use common::integrators::Integrator;
use common::utils::func::{saturate, saturate_vec, wrap};
use common::utils::rot_matrix::{euler_rate_transform, pitch_is_singular, rot_v_to_b_euler};
use nalgebra::{Matrix3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Physical parameters of the vehicle, fixed once the simulation is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParams {
    /// Gravitational acceleration [m/s^2]
    pub gravity: f64,
    /// The total mass of the vehicle [kg]
    pub mass: f64,
    /// The angular inertia along the principal axes [kg m^2]
    pub principal_inertia: Vector3<f64>,
    /// Linear drag acting on the inertial-frame velocity, per axis [kg/s]
    pub lin_drag: Vector3<f64>,
    /// Saturation limit of the collective thrust [N]
    pub thrust_max: f64,
    /// Saturation limit of each body moment [N m]
    pub moment_max: f64,
    /// Scheme used to advance the state blocks
    pub integrator: Integrator,
    /// Smallest admissible `cos(pitch)`
    pub singularity_margin: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            gravity: consts::GRAVITY,
            mass: consts::VEHICLE_MASS,
            principal_inertia: consts::VEHICLE_INERTIA.into(),
            lin_drag: consts::VEHICLE_DRAG.into(),
            thrust_max: consts::THRUST_MAX,
            moment_max: consts::MOMENT_MAX,
            integrator: Integrator::Rk4,
            singularity_margin: consts::SINGULARITY_MARGIN,
        }
    }
}

impl VehicleParams {
    /// Check that all parameters are physically meaningful.
    pub fn validate(&self) -> Result<(), SimError> {
        SimError::check_non_negative("gravity", self.gravity)?;
        SimError::check_positive("mass", self.mass)?;
        for inertia in self.principal_inertia.iter() {
            SimError::check_positive("principal_inertia", *inertia)?;
        }
        for drag in self.lin_drag.iter() {
            SimError::check_non_negative("lin_drag", *drag)?;
        }
        SimError::check_non_negative("thrust_max", self.thrust_max)?;
        SimError::check_non_negative("moment_max", self.moment_max)?;
        SimError::check_non_negative("singularity_margin", self.singularity_margin)?;
        Ok(())
    }

    /// Collective thrust which exactly cancels gravity in level attitude
    pub fn hover_thrust(&self) -> f64 {
        self.mass * self.gravity
    }

    pub fn inertia_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.principal_inertia)
    }

    pub fn drag_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.lin_drag)
    }
}

/// The physical initial condition of the vehicle within a simulation.
///
/// Any fields not defined will be initialized with zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Initial {
    pub position: Vector3<f64>,
    pub attitude: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
}

impl Initial {
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_attitude(mut self, attitude: Vector3<f64>) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Build the initial condition from untyped slices, where `None` means zero.
    ///
    /// Fails with [`SimError::InvalidDimension`] if any slice is not of length 3.
    pub fn from_slices(
        position: Option<&[f64]>,
        attitude: Option<&[f64]>,
        velocity: Option<&[f64]>,
        angular_velocity: Option<&[f64]>,
    ) -> Result<Self, SimError> {
        Ok(Self {
            position: vector3_from_slice("position", position)?,
            attitude: vector3_from_slice("attitude", attitude)?,
            velocity: vector3_from_slice("velocity", velocity)?,
            angular_velocity: vector3_from_slice("angular_velocity", angular_velocity)?,
        })
    }
}

pub(crate) fn vector3_from_slice(what: &'static str, slice: Option<&[f64]>) -> Result<Vector3<f64>, SimError> {
    match slice {
        None => Ok(Vector3::zeros()),
        Some(slice) => {
            SimError::check_dimension(what, 3, slice.len())?;
            Ok(Vector3::from_column_slice(slice))
        }
    }
}

/// Build a `[thrust, moment_x, moment_y, moment_z]` control vector from an untyped slice.
pub fn control_from_slice(slice: &[f64]) -> Result<Vector4<f64>, SimError> {
    SimError::check_dimension("control", 4, slice.len())?;
    Ok(Vector4::from_column_slice(slice))
}

/// The current physical state of the vehicle within the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadState {
    /// Number of completed steps
    pub iteration: u64,
    /// Accumulated simulated time [s]
    pub time: f64,
    /// Position of the vehicle in the inertial frame [m]
    pub position: Vector3<f64>,
    /// 3-2-1 Euler angles `[roll, pitch, yaw]` [rad]
    pub attitude: Vector3<f64>,
    /// Linear velocity of the vehicle in the inertial frame [m/s]
    pub velocity: Vector3<f64>,
    /// Angular velocity `[p, q, r]` of the vehicle in the body frame [rad/s]
    pub angular_velocity: Vector3<f64>,
}

impl QuadState {
    fn from_initial(initial: &Initial, iteration: u64, time: f64) -> Self {
        Self {
            iteration,
            time,
            position: initial.position,
            attitude: initial.attitude,
            velocity: initial.velocity,
            angular_velocity: initial.angular_velocity,
        }
    }
}

impl fmt::Display for QuadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row(f: &mut fmt::Formatter<'_>, label: &str, v: &Vector3<f64>) -> fmt::Result {
            writeln!(f, "{label:<24}: {:>12.6} {:>12.6} {:>12.6}", v.x, v.y, v.z)
        }

        // Roll and yaw are shown wrapped, the state itself is never wrapped
        let degrees = Vector3::new(
            wrap(self.attitude.x, 0.0, TAU),
            self.attitude.y,
            wrap(self.attitude.z, 0.0, TAU),
        )
        .map(f64::to_degrees);

        writeln!(f, "Iteration {} (t = {:.4} s)", self.iteration, self.time)?;
        row(f, "Position [m]", &self.position)?;
        row(f, "Attitude [rad]", &self.attitude)?;
        row(f, "Attitude [deg]", &degrees)?;
        row(f, "Velocity [m/s]", &self.velocity)?;
        row(f, "Angular velocity [rad/s]", &self.angular_velocity)
    }
}

/// Gravity force resolved in the body frame for the given roll `phi` and pitch `theta`.
pub fn gravity_force_body(mass: f64, gravity: f64, phi: f64, theta: f64) -> Vector3<f64> {
    let (s_phi, c_phi) = phi.sin_cos();
    let (s_theta, c_theta) = theta.sin_cos();
    mass * gravity * Vector3::new(-s_theta, c_theta * s_phi, c_theta * c_phi)
}

/// Rate of change of the position, `r' = v`.
pub fn position_rate(velocity: &Vector3<f64>) -> Vector3<f64> {
    *velocity
}

/// Rate of change of the Euler angles, `Phi' = Gamma(phi, theta) * omega`.
pub fn attitude_rate(attitude: &Vector3<f64>, angular_velocity: &Vector3<f64>) -> Vector3<f64> {
    euler_rate_transform(attitude.x, attitude.y) * angular_velocity
}

/// Rate of change of the linear velocity, `v' = (Fg - R^T T - Mu v) / m`.
///
/// `attitude` and `thrust` are held constant over the step, `thrust` is
/// expressed in the body frame.
pub fn velocity_rate(
    params: &VehicleParams,
    velocity: &Vector3<f64>,
    attitude: &Vector3<f64>,
    thrust: &Vector3<f64>,
) -> Vector3<f64> {
    let gravity = gravity_force_body(params.mass, params.gravity, attitude.x, attitude.y);
    let thrust = rot_v_to_b_euler(attitude).transpose() * thrust;
    let drag = params.drag_matrix() * velocity;
    (gravity - thrust - drag) / params.mass
}

/// Rate of change of the body angular velocity, `w' = I^-1 (-w x (I w) + M)`.
pub fn angular_velocity_rate(
    params: &VehicleParams,
    angular_velocity: &Vector3<f64>,
    moment: &Vector3<f64>,
) -> Vector3<f64> {
    let inertia = &params.principal_inertia;
    let gyroscopic = angular_velocity.cross(&inertia.component_mul(angular_velocity));
    (moment - gyroscopic).component_div(inertia)
}

/// Six degree-of-freedom rigid body model of a quadrotor using 3-2-1 Euler angles.
#[derive(Debug, Clone)]
pub struct Quadrotor {
    params: VehicleParams,
    state: QuadState,
}

impl Default for Quadrotor {
    fn default() -> Self {
        Self {
            params: VehicleParams::default(),
            state: QuadState::default(),
        }
    }
}

impl Quadrotor {
    pub fn new(params: VehicleParams, initial: Initial) -> Result<Self, SimError> {
        params.validate()?;
        log::debug!("Created quadrotor with {params:?}, initial condition {initial:?}");

        Ok(Self {
            params,
            state: QuadState::from_initial(&initial, 0, 0.0),
        })
    }

    /// Saturate the control input `u = [thrust, mx, my, mz]`, advance the state
    /// by `dt` seconds and return the control which was actually applied.
    ///
    /// Each of the four state blocks is advanced independently, treating the
    /// other three blocks as constants at their start-of-step values.
    pub fn step(&mut self, u: &Vector4<f64>, dt: f64) -> Vector4<f64> {
        self.state.iteration += 1;

        let thrust = Vector3::new(0.0, 0.0, saturate(u[0], self.params.thrust_max));
        let moment = saturate_vec(&Vector3::new(u[1], u[2], u[3]), self.params.moment_max);
        let applied = Vector4::new(thrust.z, moment.x, moment.y, moment.z);

        if applied != *u {
            log::warn!("Control {:?} saturated to {:?}", u.as_slice(), applied.as_slice());
        }

        let start = self.state;
        let params = &self.params;
        let integrator = params.integrator;

        let position = integrator.step(&start.position, dt, |_| position_rate(&start.velocity));
        let attitude = integrator.step(&start.attitude, dt, |att| attitude_rate(att, &start.angular_velocity));
        let velocity = integrator.step(&start.velocity, dt, |vel| {
            velocity_rate(params, vel, &start.attitude, &thrust)
        });
        let angular_velocity = integrator.step(&start.angular_velocity, dt, |w| {
            angular_velocity_rate(params, w, &moment)
        });

        self.state.position = position;
        self.state.attitude = attitude;
        self.state.velocity = velocity;
        self.state.angular_velocity = angular_velocity;
        self.state.time += dt;

        log::trace!(
            "Step {}: applied {:?}, attitude {:?}",
            self.state.iteration,
            applied.as_slice(),
            self.state.attitude.as_slice()
        );

        applied
    }

    /// Returns an error if the pitch angle is at, or has moved past, the gimbal-lock singularity.
    pub fn check_attitude(&self) -> Result<(), SimError> {
        let pitch = self.state.attitude.y;
        if pitch_is_singular(pitch, self.params.singularity_margin) {
            Err(SimError::AttitudeSingularity { pitch })
        } else {
            Ok(())
        }
    }

    /// Re-seed the state. The iteration counter and time keep counting.
    pub fn reset(&mut self, initial: &Initial) {
        log::debug!("Resetting state at iteration {} to {initial:?}", self.state.iteration);
        self.state = QuadState::from_initial(initial, self.state.iteration, self.state.time);
    }

    /// Level the vehicle, preserving its yaw angle
    pub fn make_upright(&mut self) {
        self.state.attitude.x = 0.0;
        self.state.attitude.y = 0.0;
    }

    pub fn reset_position(&mut self) {
        self.state.position = Vector3::zeros();
    }

    pub fn hover_thrust(&self) -> f64 {
        self.params.hover_thrust()
    }

    /// Rotation from the inertial frame to the body frame at the current attitude
    pub fn rotation_body_from_inertial(&self) -> Matrix3<f64> {
        rot_v_to_b_euler(&self.state.attitude)
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn state(&self) -> QuadState {
        self.state
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.state.position
    }

    pub fn attitude(&self) -> &Vector3<f64> {
        &self.state.attitude
    }

    pub fn velocity(&self) -> &Vector3<f64> {
        &self.state.velocity
    }

    pub fn angular_velocity(&self) -> &Vector3<f64> {
        &self.state.angular_velocity
    }

    pub fn iteration(&self) -> u64 {
        self.state.iteration
    }

    pub fn time(&self) -> f64 {
        self.state.time
    }
}

impl fmt::Display for Quadrotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.fmt(f)
    }
}
