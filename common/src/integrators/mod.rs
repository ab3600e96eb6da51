//! Fixed-step explicit integrators for small, statically sized states.
//!
//! The integrators know nothing about the system they advance. The derivative
//! function `f(y) -> dy/dt` must be pure at the instant it is evaluated, it may
//! however close over values that are held constant for the duration of a step.

use nalgebra::{RealField, SVector};
use serde::{Deserialize, Serialize};

/// Selects which fixed-step scheme is used to advance a state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrator {
    /// Classical 4th order Runge-Kutta
    #[default]
    Rk4,
    /// Explicit (forward) Euler
    Euler,
}

impl Integrator {
    /// Advance `y` by a single step of length `dt` using the selected scheme.
    pub fn step<T, const N: usize, F>(&self, y: &SVector<T, N>, dt: T, f: F) -> SVector<T, N>
    where
        T: RealField + Copy,
        F: Fn(&SVector<T, N>) -> SVector<T, N>,
    {
        match self {
            Integrator::Rk4 => rk4_step(y, dt, f),
            Integrator::Euler => euler_step(y, dt, f),
        }
    }
}

/// Single classical Runge-Kutta step.
///
/// ```text
/// k1 = f(y)
/// k2 = f(y + dt/2 * k1)
/// k3 = f(y + dt/2 * k2)
/// k4 = f(y + dt * k3)
/// y' = y + dt/6 * (k1 + 2 k2 + 2 k3 + k4)
/// ```
pub fn rk4_step<T, const N: usize, F>(y: &SVector<T, N>, dt: T, f: F) -> SVector<T, N>
where
    T: RealField + Copy,
    F: Fn(&SVector<T, N>) -> SVector<T, N>,
{
    let two = T::one() + T::one();
    let half_dt = dt / two;

    let k1 = f(y);
    let k2 = f(&(y + k1 * half_dt));
    let k3 = f(&(y + k2 * half_dt));
    let k4 = f(&(y + k3 * dt));

    y + (k1 + (k2 + k3) * two + k4) * (dt / (two + two + two))
}

/// Single explicit Euler step, `y' = y + dt * f(y)`.
pub fn euler_step<T, const N: usize, F>(y: &SVector<T, N>, dt: T, f: F) -> SVector<T, N>
where
    T: RealField + Copy,
    F: Fn(&SVector<T, N>) -> SVector<T, N>,
{
    y + f(y) * dt
}
