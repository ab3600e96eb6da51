use nalgebra::{SVector, Scalar};
use num_traits::float::Float;

/// Clamp `num` to the symmetric range `[-limit, limit]`, preserving its sign.
///
/// Values with `|num| <= limit` pass through unchanged, larger magnitudes are
/// replaced by `limit` carrying the sign of `num`. A negative `limit` is
/// treated as its absolute value. NaN has no magnitude and saturates to zero.
pub fn saturate<T: Float>(num: T, limit: T) -> T {
    let limit = limit.abs();
    if num.is_nan() {
        T::zero()
    } else if num.abs() > limit {
        limit.copysign(num)
    } else {
        num
    }
}

/// Component-wise [`saturate`] of a fixed-size vector against a common limit.
pub fn saturate_vec<T: Float + Scalar, const N: usize>(vec: &SVector<T, N>, limit: T) -> SVector<T, N> {
    vec.map(|v| saturate(v, limit))
}

/// Wrap the value of `num` such that it lies between `[min,max)` (i.e. min <= num < max)
pub fn wrap<T: Float>(mut num: T, min: T, max: T) -> T {
    assert!(min < max, "Invalid wrapping bounds");
    let width = max - min;

    if !num.is_finite() {
        return num;
    }

    while num < min {
        num = num + width;
    }
    while num >= max {
        num = num - width;
    }

    num
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{PI, TAU};
    use nalgebra::Vector3;

    #[test]
    fn test_saturate_within_limit() {
        for value in [-2.0, -1.5, 0.0, 0.3, 2.0] {
            assert_eq!(saturate(value, 2.0), value);
        }
    }

    #[test]
    fn test_saturate_beyond_limit() {
        assert_eq!(saturate(40.1, 40.0), 40.0);
        assert_eq!(saturate(-1e9, 40.0), -40.0);
        assert_eq!(saturate(3.0_f32, 2.0), 2.0);
        assert_eq!(saturate(f64::INFINITY, 2.0), 2.0);
        assert_eq!(saturate(f64::NEG_INFINITY, 2.0), -2.0);
    }

    #[test]
    fn test_saturate_nan() {
        assert_eq!(saturate(f64::NAN, 2.0), 0.0);
        assert_eq!(saturate(-f64::NAN, 40.0), 0.0);
        let moments = Vector3::new(f64::NAN, -3.0, 0.5);
        assert_eq!(saturate_vec(&moments, 2.0), Vector3::new(0.0, -2.0, 0.5));
    }

    #[test]
    fn test_saturate_negative_limit() {
        assert_eq!(saturate(5.0, -2.0), 2.0);
        assert_eq!(saturate(-5.0, -2.0), -2.0);
    }

    #[test]
    fn test_saturate_vec() {
        let moments = Vector3::new(-3.0, 1.0, 2.5);
        assert_eq!(saturate_vec(&moments, 2.0), Vector3::new(-2.0, 1.0, 2.0));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0.5, 0.0, TAU), 0.5);
        assert!((wrap(-PI / 2.0, 0.0, TAU) - 1.5 * PI).abs() < 1e-12);
        assert!((wrap(5.0 * PI, -PI, PI) - (-PI)).abs() < 1e-12);
        assert!(wrap(f64::NAN, 0.0, TAU).is_nan());
    }
}
