use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Expected {expected} elements for {what}, got {got}.")]
    InvalidDimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Pitch angle {pitch} rad is too close to +/- pi/2, the Euler rates are undefined.")]
    AttitudeSingularity { pitch: f64 },
    #[error("Parameter <{name}> has invalid value {value}.")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SimError {
    /// Check that `got` matches `expected`, otherwise produce an [`SimError::InvalidDimension`].
    pub fn check_dimension(what: &'static str, expected: usize, got: usize) -> Result<(), Self> {
        if expected == got {
            Ok(())
        } else {
            Err(SimError::InvalidDimension {
                what,
                expected,
                got,
            })
        }
    }

    /// Require `value` to be finite and strictly positive.
    pub fn check_positive(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(SimError::InvalidParameter { name, value })
        }
    }

    /// Require `value` to be finite and not negative.
    pub fn check_non_negative(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(SimError::InvalidParameter { name, value })
        }
    }
}
