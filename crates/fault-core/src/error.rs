//! Engine error taxonomy.
//!
//! Everything else that happens during a run (threshold crossings, repeated
//! ruptures, near-simultaneous events on different faults) is normal control
//! flow. A returned error aborts the run.

/// Errors raised by fault construction and the simulation driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A construction-time parameter is outside its valid range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A year beyond the preallocated horizon was requested
    #[error("year {year} is outside the simulated horizon of {horizon} years")]
    YearOutOfRange { year: u64, horizon: u64 },

    /// A rupture cascade tried to rupture the same fault twice
    #[error("rupture cascade in year {year} re-entered fault {fault}")]
    UnboundedCascade { fault: usize, year: u64 },
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails with [`SimError::InvalidParameter`] unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid(name, format!("must be a finite value > 0, got {value}")))
    }
}

/// Fails with [`SimError::InvalidParameter`] unless `value` is finite and non-negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid(name, format!("must be a finite value >= 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("x", 2.5), Ok(2.5));
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", -1.0).is_err());
        assert!(require_positive("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(require_non_negative("x", 0.0), Ok(0.0));
        assert!(require_non_negative("x", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = require_positive("recurrence_interval", 0.0).unwrap_err();
        assert!(err.to_string().contains("recurrence_interval"));

        let err = SimError::YearOutOfRange { year: 10, horizon: 10 };
        assert_eq!(err.to_string(), "year 10 is outside the simulated horizon of 10 years");
    }
}
