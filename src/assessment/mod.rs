//! Risk computations over an immutable [`RiskModel`](crate::model::risk_model::RiskModel).
//!
//! Every function here is pure: same model and TTG, same answer. Any
//! probability leaving [0,1] is reported as
//! [`RiskError::InvalidProbability`] rather than clamped.

pub mod failure;
pub mod recovery;
pub mod risk;
pub mod scenario;
pub mod sweep;

use crate::core::errors::{Result, RiskError};

/// Pass `value` through if it is a probability, otherwise report it.
pub fn checked_probability(context: impl FnOnce() -> String, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RiskError::InvalidProbability {
            context: context(),
            value,
        })
    }
}

/// Reject negative or non-finite time-to-grounding.
pub fn validate_ttg(ttg: f64) -> Result<f64> {
    if ttg.is_finite() && ttg >= 0.0 {
        Ok(ttg)
    } else {
        Err(RiskError::InvalidTtg { value: ttg })
    }
}
