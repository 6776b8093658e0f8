//! Scenario evaluator: probability that every recovery chain of a mode fails
//! before grounding.
//!
//! - action: `Start` succeeds with `recovery_probability(ttg, t)`; `Restart`
//!   additionally needs the restart itself to work (`p_restart × …`).
//! - branch: `AND`-joined actions multiply.
//! - chain: `OR`-separated branches are independent alternatives, so the
//!   chain fails only if every branch fails.
//! - mode: chains are independent alternatives; recovery fails with
//!   `∏ (1 − p_chain)`.

use crate::assessment::checked_probability;
use crate::assessment::recovery::recovery_probability;
use crate::core::errors::{Result, RiskError};
use crate::model::engine::EngineRegistry;
use crate::model::mode::{Action, MachineryMode, RecoveryChain, Verb};

/// Evaluates recovery chains against one engine registry.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEvaluator<'a> {
    engines: &'a EngineRegistry,
}

impl<'a> ScenarioEvaluator<'a> {
    pub fn new(engines: &'a EngineRegistry) -> Self {
        Self { engines }
    }

    /// Probability that a single action succeeds in time.
    pub fn action_success_probability(&self, action: &Action, ttg: f64) -> Result<f64> {
        let engine = self.engines.get(&action.engine)?;
        let in_time = recovery_probability(ttg, engine.recovery_time);
        let p = match action.verb {
            Verb::Start => in_time,
            Verb::Restart => engine.restart_success_probability * in_time,
        };
        checked_probability(|| format!("action {:?}", action.label()), p)
    }

    /// Probability that a chain restores power.
    pub fn chain_success_probability(&self, chain: &RecoveryChain, ttg: f64) -> Result<f64> {
        let branches = chain
            .branches()
            .map(|branch| {
                branch.iter().try_fold(1.0, |running, action| {
                    Ok::<_, RiskError>(running * self.action_success_probability(action, ttg)?)
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        // A lone branch is the chain; skip the 1 − (1 − p) round trip.
        let p = match branches.as_slice() {
            [single] => *single,
            many => 1.0 - many.iter().map(|p| 1.0 - p).product::<f64>(),
        };
        checked_probability(|| "recovery chain success".to_string(), p)
    }

    /// Success probability of each chain of `mode`, in declaration order.
    pub fn chain_success_probabilities(&self, mode: &MachineryMode, ttg: f64) -> Result<Vec<f64>> {
        mode.chains()
            .iter()
            .map(|chain| self.chain_success_probability(chain, ttg))
            .collect()
    }

    /// Probability that no chain of `mode` recovers before grounding.
    ///
    /// A mode without chains cannot recover: the result is exactly 1.
    pub fn recovery_failure_probability(&self, mode: &MachineryMode, ttg: f64) -> Result<f64> {
        if mode.chains().is_empty() {
            return Ok(1.0);
        }
        let failure = self
            .chain_success_probabilities(mode, ttg)?
            .into_iter()
            .map(|p| 1.0 - p)
            .product::<f64>();
        checked_probability(
            || format!("recovery failure of mode {}", mode.name()),
            failure,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::engine::Engine;
    use crate::model::mode::Connective;

    fn registry() -> EngineRegistry {
        EngineRegistry::new(vec![
            Engine::new("ME", 3e-9, 50.0, 0.4).unwrap(),
            Engine::new("DG1", 6e-9, 35.0, 0.5).unwrap(),
            Engine::new("HSG", 2e-9, 12.0, 1.0).unwrap(),
        ])
        .unwrap()
    }

    fn mode(name: &str, steps: &[(Verb, &str, Connective)]) -> MachineryMode {
        MachineryMode::from_steps(
            name,
            steps
                .iter()
                .map(|(v, e, c)| Action::new(*v, *e, *c))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn restart_multiplies_restart_probability() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let restart = Action::new(Verb::Restart, "ME", Connective::Terminate);
        let p = eval.action_success_probability(&restart, 100.0).unwrap();
        assert!((p - 0.4 * (-0.5f64).exp()).abs() < 1e-15);
        assert!((p - 0.2426).abs() < 1e-4);
    }

    #[test]
    fn single_restart_chain_matches_reference_figures() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let mec = mode("MEC", &[(Verb::Restart, "ME", Connective::Terminate)]);
        let failure = eval.recovery_failure_probability(&mec, 100.0).unwrap();
        assert!((failure - 0.7574).abs() < 1e-4);
    }

    #[test]
    fn single_start_chain_is_exact_complement() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let m = mode("solo", &[(Verb::Start, "DG1", Connective::Terminate)]);
        for ttg in [0.0, 10.0, 35.0, 36.0, 100.0, 2000.0] {
            let failure = eval.recovery_failure_probability(&m, ttg).unwrap();
            assert_eq!(failure, 1.0 - recovery_probability(ttg, 35.0));
        }
    }

    #[test]
    fn and_steps_multiply_within_chain() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let m = mode(
            "pair",
            &[
                (Verb::Start, "DG1", Connective::And),
                (Verb::Start, "HSG", Connective::Terminate),
            ],
        );
        let ttg = 200.0;
        let expected = recovery_probability(ttg, 35.0) * recovery_probability(ttg, 12.0);
        let chain = eval.chain_success_probability(&m.chains()[0], ttg).unwrap();
        assert!((chain - expected).abs() < 1e-15);
    }

    #[test]
    fn or_opens_independent_branch() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let ttg = 120.0;
        let p_me = 0.4 * recovery_probability(ttg, 50.0);
        let p_hsg = recovery_probability(ttg, 12.0);

        let with_or = mode(
            "MEC",
            &[
                (Verb::Restart, "ME", Connective::Or),
                (Verb::Start, "HSG", Connective::Terminate),
            ],
        );
        let as_chains = mode(
            "MEC-split",
            &[
                (Verb::Restart, "ME", Connective::Terminate),
                (Verb::Start, "HSG", Connective::Terminate),
            ],
        );

        let expected = (1.0 - p_me) * (1.0 - p_hsg);
        let or_failure = eval.recovery_failure_probability(&with_or, ttg).unwrap();
        let split_failure = eval.recovery_failure_probability(&as_chains, ttg).unwrap();
        assert!((or_failure - expected).abs() < 1e-12);
        assert!((split_failure - expected).abs() < 1e-12);
        // Not the AND reading.
        assert!((or_failure - (1.0 - p_me * p_hsg)).abs() > 1e-3);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let ttg = 300.0;
        let m = mode(
            "mixed",
            &[
                (Verb::Start, "DG1", Connective::And),
                (Verb::Start, "HSG", Connective::Or),
                (Verb::Restart, "ME", Connective::Terminate),
            ],
        );
        let pair = recovery_probability(ttg, 35.0) * recovery_probability(ttg, 12.0);
        let me = 0.4 * recovery_probability(ttg, 50.0);
        let chain = eval.chain_success_probability(&m.chains()[0], ttg).unwrap();
        assert!((chain - (1.0 - (1.0 - pair) * (1.0 - me))).abs() < 1e-12);
    }

    #[test]
    fn mode_without_chains_cannot_recover() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let empty = MachineryMode::new("idle", Vec::new()).unwrap();
        assert_eq!(eval.recovery_failure_probability(&empty, 0.0).unwrap(), 1.0);
        assert_eq!(eval.recovery_failure_probability(&empty, 1e6).unwrap(), 1.0);
        assert!(eval.chain_success_probabilities(&empty, 10.0).unwrap().is_empty());
    }

    #[test]
    fn unknown_engine_is_an_error_not_zero() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let ghost = Action::new(Verb::Start, "DG9", Connective::Terminate);
        let err = eval.action_success_probability(&ghost, 100.0).unwrap_err();
        assert_eq!(err.code(), "MSO-2001");
    }

    #[test]
    fn no_time_means_certain_failure() {
        let reg = registry();
        let eval = ScenarioEvaluator::new(&reg);
        let m = mode(
            "PTO",
            &[
                (Verb::Restart, "ME", Connective::Terminate),
                (Verb::Start, "HSG", Connective::Terminate),
            ],
        );
        assert_eq!(eval.recovery_failure_probability(&m, 5.0).unwrap(), 1.0);
    }
}
