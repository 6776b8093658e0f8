//! Machinery failure probability of a mode.

use crate::assessment::checked_probability;
use crate::core::errors::{Result, RiskError};
use crate::model::engine::EngineRegistry;
use crate::model::mode::MachineryMode;

/// Probability that at least one engine the mode relies on fails:
/// `1 − ∏ (1 − failure_rate)` over the distinct engines its chains reference.
pub fn failure_probability(engines: &EngineRegistry, mode: &MachineryMode) -> Result<f64> {
    let survival = mode
        .relevant_engines()
        .into_iter()
        .try_fold(1.0, |acc, name| {
            Ok::<_, RiskError>(acc * (1.0 - engines.get(name)?.failure_rate))
        })?;
    checked_probability(
        || format!("machinery failure of mode {}", mode.name()),
        1.0 - survival,
    )
}
