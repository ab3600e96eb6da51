/// The gravitational constant [m/s^2]
pub const GRAVITY: f64 = 9.81;

/// Mass of the reference vehicle [kg]
pub const VEHICLE_MASS: f64 = 3.81;

/// Principal moments of inertia of the reference vehicle [kg m^2]
pub const VEHICLE_INERTIA: [f64; 3] = [0.060224, 0.122198, 0.132166];

/// Linear drag coefficients, applied per axis to the inertial-frame velocity [kg/s]
pub const VEHICLE_DRAG: [f64; 3] = [0.85, 0.85, 0.85];

/// Maximum collective thrust magnitude [N]
pub const THRUST_MAX: f64 = 40.0;

/// Maximum moment magnitude about any single body axis [N m]
pub const MOMENT_MAX: f64 = 2.0;

/// Smallest admissible `cos(pitch)` before the attitude is considered singular
pub const SINGULARITY_MARGIN: f64 = 1e-6;
