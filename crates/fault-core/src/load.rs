//! Phase loading functions.
//!
//! Each simulated year a fault's phase grows by an increment that depends on
//! the loading mode. Linear loading is constant; nonlinear loading blends a
//! transient that decays with time since the last rupture (fast post-seismic
//! reloading) with a constant background rate.
//!
//! Integrated over one recurrence interval the nonlinear increment sums to
//! `nonlinear_weight * (1 - e^-numerator) + linear_weight`, which is 1 for the
//! default weights up to the small `e^-5` tail.

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, SimError};

/// Tuning knobs for the nonlinear load function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadParams {
    /// Transient decay constant numerator: `k = relaxation_numerator / recurrence_interval`
    pub relaxation_numerator: f64,
    /// Weight of the decaying transient term
    pub nonlinear_weight: f64,
    /// Weight of the constant background term
    pub linear_weight: f64,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            relaxation_numerator: 5.0,
            nonlinear_weight: 2.0 / 3.0,
            linear_weight: 1.0 / 3.0,
        }
    }
}

impl LoadParams {
    /// Checks that every knob is usable.
    pub fn validate(&self) -> Result<(), SimError> {
        require_positive("load.relaxation_numerator", self.relaxation_numerator)?;
        require_non_negative("load.nonlinear_weight", self.nonlinear_weight)?;
        require_non_negative("load.linear_weight", self.linear_weight)?;
        Ok(())
    }
}

/// Phase increment per year under constant loading.
///
/// # Panics
///
/// Panics if `recurrence_interval` is not strictly positive.
pub fn linear_increment(recurrence_interval: f64) -> f64 {
    assert!(
        recurrence_interval > 0.0,
        "recurrence interval must be positive, got {recurrence_interval}"
    );
    1.0 / recurrence_interval
}

/// Phase increment per year under nonlinear loading, `elapsed` years after the last rupture.
///
/// # Panics
///
/// Panics if `recurrence_interval` is not strictly positive.
pub fn nonlinear_increment(elapsed: f64, recurrence_interval: f64, params: &LoadParams) -> f64 {
    let linear = linear_increment(recurrence_interval);
    let k = params.relaxation_numerator * linear;
    params.nonlinear_weight * k * (-k * elapsed).exp() + params.linear_weight * linear
}
