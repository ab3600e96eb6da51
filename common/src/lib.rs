//! Shared math for the quadrotor simulator: frame rotations, the Euler rate
//! transform, actuator saturation, fixed-step integrators and the error type
//! used across the workspace.

pub mod consts;
pub mod errors;
pub mod integrators;
pub mod utils;

// Re-exported for implementors
pub use nalgebra;

pub use errors::SimError;
pub use integrators::Integrator;
