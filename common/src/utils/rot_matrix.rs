use nalgebra::{Matrix3, Vector3};

// All rotations below are passive (frame) rotations following the aerospace
// 3-2-1 convention: the vehicle frame is yawed by psi into frame v1, pitched by
// theta into frame v2 and finally rolled by phi into the body frame. Each
// matrix maps the coordinates of a vector in the former frame into the latter.

// ---------------------- //
// Single-axis rotations  //
// ---------------------- //

/// Rotation from the vehicle frame to the vehicle-1 frame (yaw `psi` about z)
pub fn rot_v_to_v1(psi: f64) -> Matrix3<f64> {
    let (s, c) = psi.sin_cos();
    Matrix3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotation from the vehicle-1 frame to the vehicle-2 frame (pitch `theta` about y)
pub fn rot_v1_to_v2(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    )
}

/// Rotation from the vehicle-2 frame to the body frame (roll `phi` about x)
pub fn rot_v2_to_b(phi: f64) -> Matrix3<f64> {
    let (s, c) = phi.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

// ---------------------- //
// Composed rotations     //
// ---------------------- //

/// Rotation from the vehicle (or inertial) frame to the body frame.
///
/// Since the vehicle frame is only a translation of the inertial frame, this
/// maps inertial-frame vectors into their body-frame representation.
pub fn rot_v_to_b(phi: f64, theta: f64, psi: f64) -> Matrix3<f64> {
    rot_v2_to_b(phi) * rot_v1_to_v2(theta) * rot_v_to_v1(psi)
}

/// Rotation from the body frame to the vehicle (or inertial) frame, the transpose of [`rot_v_to_b`].
pub fn rot_b_to_v(phi: f64, theta: f64, psi: f64) -> Matrix3<f64> {
    rot_v_to_b(phi, theta, psi).transpose()
}

/// Same as [`rot_v_to_b`] but taking the Euler angles as `[phi, theta, psi]`.
pub fn rot_v_to_b_euler(euler: &Vector3<f64>) -> Matrix3<f64> {
    rot_v_to_b(euler.x, euler.y, euler.z)
}

// ---------------------- //
// Euler rate transform   //
// ---------------------- //

/// Matrix mapping body angular rates `[p, q, r]` to Euler angle rates.
///
/// `d/dt [phi, theta, psi] = euler_rate_transform(phi, theta) * [p, q, r]`
///
/// **Note**: The matrix is singular at `theta = +/- pi/2` where `cos(theta)` vanishes.
/// No check is performed here, see [`pitch_is_singular`].
pub fn euler_rate_transform(phi: f64, theta: f64) -> Matrix3<f64> {
    let (s_phi, c_phi) = phi.sin_cos();
    let (s_theta, c_theta) = theta.sin_cos();
    let t_theta = s_theta / c_theta;

    Matrix3::new(
        1.0, s_phi * t_theta, c_phi * t_theta, //
        0.0, c_phi, -s_phi, //
        0.0, s_phi / c_theta, c_phi / c_theta,
    )
}

/// Whether `theta` lies outside the valid pitch range `(-pi/2, pi/2)`, shrunk
/// by `margin` as measured on `cos(theta)`.
///
/// A pitch which has stepped past the gimbal-lock singularity is also reported.
pub fn pitch_is_singular(theta: f64, margin: f64) -> bool {
    !(theta.cos() > margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, assert_abs_diff_eq, assert_relative_eq};
    use core::f64::consts::{FRAC_PI_2, PI};
    use nalgebra::Rotation3;

    /// A spread of angles covering all quadrants, pitch kept off the singularity
    fn angle_grid() -> impl Iterator<Item = (f64, f64, f64)> {
        let rolls = [0.0, 0.3, -1.2, 2.9, 5.5];
        let pitches = [0.0, 0.4, -0.9, 1.45, -1.5];
        let yaws = [0.0, 1.0, -2.5, 3.3, 6.0];
        rolls.into_iter().flat_map(move |phi| {
            pitches
                .into_iter()
                .flat_map(move |theta| yaws.into_iter().map(move |psi| (phi, theta, psi)))
        })
    }

    #[test]
    fn test_identity_at_zero() {
        assert_eq!(rot_v_to_b(0.0, 0.0, 0.0), Matrix3::identity());
        assert_eq!(euler_rate_transform(0.0, 0.0), Matrix3::identity());
    }

    #[test]
    fn test_rot_orthonormal() {
        for (phi, theta, psi) in angle_grid() {
            let r = rot_v_to_b(phi, theta, psi);
            if !abs_diff_eq!(r.transpose() * r, Matrix3::identity(), epsilon = 1e-12) {
                panic!("Not orthonormal for angles ({phi}, {theta}, {psi})\nGot: {r}");
            }
            assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_axis_composition() {
        let (phi, theta, psi) = (0.2, -0.3, 1.1);
        assert_eq!(rot_v_to_b(0.0, 0.0, psi), rot_v_to_v1(psi));
        assert_eq!(rot_v_to_b(0.0, theta, 0.0), rot_v1_to_v2(theta));
        assert_eq!(rot_v_to_b(phi, 0.0, 0.0), rot_v2_to_b(phi));
    }

    #[test]
    fn test_matches_nalgebra_euler() {
        // nalgebra builds the active body-to-world rotation Rz(yaw) * Ry(pitch) * Rx(roll)
        for (phi, theta, psi) in angle_grid() {
            let expected = Rotation3::from_euler_angles(phi, theta, psi).into_inner();
            assert_abs_diff_eq!(rot_b_to_v(phi, theta, psi), expected, epsilon = 1e-12);
            assert_abs_diff_eq!(
                rot_v_to_b_euler(&Vector3::new(phi, theta, psi)),
                expected.transpose(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_gravity_direction() {
        // Pitching nose up makes gravity point backwards along the body x-axis
        let down = Vector3::new(0.0, 0.0, 1.0);
        let body = rot_v_to_b(0.0, 0.3, 0.7) * down;
        assert_abs_diff_eq!(body, Vector3::new(-(0.3_f64.sin()), 0.0, 0.3_f64.cos()), epsilon = 1e-12);
    }

    #[test]
    fn test_rate_transform_inverse() {
        for (phi, theta, _) in angle_grid() {
            let (s_phi, c_phi) = phi.sin_cos();
            let (s_theta, c_theta) = theta.sin_cos();

            // Maps Euler rates back onto body rates
            let inverse = Matrix3::new(
                1.0, 0.0, -s_theta, //
                0.0, c_phi, s_phi * c_theta, //
                0.0, -s_phi, c_phi * c_theta,
            );

            let gamma = euler_rate_transform(phi, theta);
            assert_abs_diff_eq!(gamma * inverse, Matrix3::identity(), epsilon = 1e-9);
            assert_relative_eq!(gamma.determinant(), 1.0 / c_theta, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_rate_transform_small_angles() {
        let eps = 1e-4;
        let gamma = euler_rate_transform(eps, -eps);
        assert_abs_diff_eq!(gamma, Matrix3::identity(), epsilon = 2.0 * eps);
    }

    #[test]
    fn test_pure_functions_repeatable() {
        let (phi, theta, psi) = (0.4, -0.2, 2.0);
        assert_eq!(rot_v_to_b(phi, theta, psi), rot_v_to_b(phi, theta, psi));
        assert_eq!(euler_rate_transform(phi, theta), euler_rate_transform(phi, theta));
    }

    #[test]
    fn test_pitch_singularity() {
        assert!(!pitch_is_singular(0.0, 1e-6));
        assert!(!pitch_is_singular(1.5, 1e-6));
        assert!(pitch_is_singular(FRAC_PI_2, 1e-6));
        assert!(pitch_is_singular(-FRAC_PI_2, 1e-6));
        assert!(pitch_is_singular(1.5, 0.1));
        assert!(pitch_is_singular(f64::NAN, 1e-6));
        assert!(pitch_is_singular(1.58, 1e-6));
        assert!(pitch_is_singular(PI, 1e-6));
    }
}
