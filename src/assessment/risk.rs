//! Risk aggregation and risk-minimizing mode selection.

#![allow(missing_docs)]

use serde::Serialize;

use crate::assessment::failure::failure_probability;
use crate::assessment::scenario::ScenarioEvaluator;
use crate::assessment::{checked_probability, validate_ttg};
use crate::core::errors::{Result, RiskError};
use crate::model::mode::MachineryMode;
use crate::model::risk_model::RiskModel;

/// Full risk breakdown of one (TTG, mode) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeRisk {
    pub mode: String,
    pub ttg: f64,
    pub failure_probability: f64,
    pub recovery_failure_probability: f64,
    pub grounding_probability: f64,
    pub total_risk: f64,
}

/// Outcome of a selection: the winner plus every candidate, declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSelection {
    pub mode: String,
    pub total_risk: f64,
    pub candidates: Vec<ModeRisk>,
}

/// Read-only view that turns a [`RiskModel`] into risk figures.
#[derive(Debug, Clone, Copy)]
pub struct RiskAssessor<'a> {
    model: &'a RiskModel,
}

impl<'a> RiskAssessor<'a> {
    pub fn new(model: &'a RiskModel) -> Self {
        Self { model }
    }

    pub fn failure_probability(&self, mode: &str) -> Result<f64> {
        failure_probability(self.model.engines(), self.model.mode(mode)?)
    }

    pub fn recovery_failure_probability(&self, ttg: f64, mode: &str) -> Result<f64> {
        let ttg = validate_ttg(ttg)?;
        ScenarioEvaluator::new(self.model.engines())
            .recovery_failure_probability(self.model.mode(mode)?, ttg)
    }

    /// `failure × recovery failure`.
    pub fn grounding_probability(&self, ttg: f64, mode: &str) -> Result<f64> {
        Ok(self.assess(ttg, mode)?.grounding_probability)
    }

    /// `grounding probability × cost sum × scale`.
    pub fn total_risk(&self, ttg: f64, mode: &str) -> Result<f64> {
        Ok(self.assess(ttg, mode)?.total_risk)
    }

    pub fn assess(&self, ttg: f64, mode: &str) -> Result<ModeRisk> {
        let ttg = validate_ttg(ttg)?;
        self.assess_mode(ttg, self.model.mode(mode)?)
    }

    fn assess_mode(&self, ttg: f64, mode: &MachineryMode) -> Result<ModeRisk> {
        let failure = failure_probability(self.model.engines(), mode)?;
        let recovery_failure =
            ScenarioEvaluator::new(self.model.engines()).recovery_failure_probability(mode, ttg)?;
        let grounding = checked_probability(
            || format!("grounding probability of mode {}", mode.name()),
            failure * recovery_failure,
        )?;
        let total_risk = grounding * self.model.costs().total() * self.model.scale();
        Ok(ModeRisk {
            mode: mode.name().to_string(),
            ttg,
            failure_probability: failure,
            recovery_failure_probability: recovery_failure,
            grounding_probability: grounding,
            total_risk,
        })
    }

    /// Mode with the smallest total risk at `ttg`; ties go to the first declared.
    pub fn select_mode(&self, ttg: f64) -> Result<String> {
        Ok(self.select_mode_detailed(ttg)?.mode)
    }

    pub fn select_mode_detailed(&self, ttg: f64) -> Result<ModeSelection> {
        let ttg = validate_ttg(ttg)?;
        if self.model.modes().is_empty() {
            return Err(RiskError::NoModesConfigured);
        }

        let candidates = self
            .model
            .modes()
            .iter()
            .map(|mode| self.assess_mode(ttg, mode))
            .collect::<Result<Vec<_>>>()?;

        let mut best = &candidates[0];
        for candidate in &candidates[1..] {
            if candidate.total_risk < best.total_risk {
                best = candidate;
            }
        }

        Ok(ModeSelection {
            mode: best.mode.clone(),
            total_risk: best.total_risk,
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cost::CostVector;
    use crate::model::engine::{Engine, EngineRegistry};
    use crate::model::mode::{Action, Connective, Verb};
    use crate::model::presets::reference_vessel;
    use proptest::prelude::*;

    fn mec_only(scale: f64) -> RiskModel {
        let engines =
            EngineRegistry::new(vec![Engine::new("ME", 3e-9, 50.0, 0.4).unwrap()]).unwrap();
        let mec = MachineryMode::from_steps(
            "MEC",
            vec![Action::new(Verb::Restart, "ME", Connective::Terminate)],
        )
        .unwrap();
        let costs = CostVector::new(100_000.0, 50_000.0, 200_000.0, 150_000.0, 10_000.0).unwrap();
        RiskModel::new(engines, vec![mec], costs, scale).unwrap()
    }

    #[test]
    fn reference_grounding_figures() {
        let model = mec_only(1000.0);
        let assessor = RiskAssessor::new(&model);
        let risk = assessor.assess(100.0, "MEC").unwrap();

        assert!((risk.failure_probability - 3e-9).abs() < 1e-15);
        assert!((risk.recovery_failure_probability - 0.7574).abs() < 1e-4);
        assert!((risk.grounding_probability - 2.27e-9).abs() < 1e-11);
        let expected = risk.grounding_probability * 510_000.0 * 1000.0;
        assert!((risk.total_risk - expected).abs() < 1e-9);
    }

    #[test]
    fn scale_is_applied_linearly() {
        let a = RiskAssessor::new(&mec_only(100.0)).total_risk(100.0, "MEC").unwrap();
        let b = RiskAssessor::new(&mec_only(1000.0)).total_risk(100.0, "MEC").unwrap();
        assert!((b - 10.0 * a).abs() < 1e-12);
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let model = mec_only(1.0);
        let err = RiskAssessor::new(&model).total_risk(100.0, "PTI").unwrap_err();
        assert_eq!(err.code(), "MSO-2002");
        let err = RiskAssessor::new(&model).failure_probability("PTI").unwrap_err();
        assert_eq!(err.code(), "MSO-2002");
    }

    #[test]
    fn negative_ttg_rejected() {
        let model = mec_only(1.0);
        let err = RiskAssessor::new(&model).assess(-1.0, "MEC").unwrap_err();
        assert_eq!(err.code(), "MSO-2005");
    }

    #[test]
    fn selection_without_modes_fails() {
        let model = RiskModel::new(
            EngineRegistry::default(),
            Vec::new(),
            CostVector::default(),
            1.0,
        )
        .unwrap();
        let err = RiskAssessor::new(&model).select_mode(10.0).unwrap_err();
        assert!(matches!(err, RiskError::NoModesConfigured));
    }

    #[test]
    fn near_overflow_costs_keep_selection_minimal() {
        let engines = EngineRegistry::new(vec![
            Engine::new("A", 0.0, 50.0, 0.4).unwrap(),
            Engine::new("B", 0.5, 50.0, 0.4).unwrap(),
        ])
        .unwrap();
        let modes = [("A-mode", "A"), ("B-mode", "B")]
            .into_iter()
            .map(|(name, engine)| {
                MachineryMode::from_steps(
                    name,
                    vec![Action::new(Verb::Start, engine, Connective::Terminate)],
                )
                .unwrap()
            })
            .collect();
        let costs = CostVector::new(f64::MAX / 4.0, f64::MAX / 4.0, 0.0, 0.0, 0.0).unwrap();
        let model = RiskModel::new(engines, modes, costs, 1.0).unwrap();

        let selection = RiskAssessor::new(&model).select_mode_detailed(10.0).unwrap();
        assert_eq!(selection.mode, "A-mode");
        for candidate in &selection.candidates {
            assert!(candidate.total_risk.is_finite());
            assert!(selection.total_risk <= candidate.total_risk);
        }
    }

    #[test]
    fn ties_go_to_first_declared_mode() {
        let engines =
            EngineRegistry::new(vec![Engine::new("ME", 0.0, 50.0, 0.4).unwrap()]).unwrap();
        let modes = ["B", "A", "C"]
            .into_iter()
            .map(|name| {
                MachineryMode::from_steps(
                    name,
                    vec![Action::new(Verb::Start, "ME", Connective::Terminate)],
                )
                .unwrap()
            })
            .collect();
        let model = RiskModel::new(engines, modes, CostVector::default(), 1.0).unwrap();
        assert_eq!(RiskAssessor::new(&model).select_mode(10.0).unwrap(), "B");
    }

    #[test]
    fn reference_vessel_prefers_redundant_mode_at_short_ttg() {
        let model = reference_vessel().to_model(1000.0).unwrap();
        let selection = RiskAssessor::new(&model).select_mode_detailed(60.0).unwrap();
        assert_eq!(selection.candidates.len(), 3);
        for candidate in &selection.candidates {
            assert!(selection.total_risk <= candidate.total_risk);
        }
    }

    proptest! {
        #[test]
        fn selected_mode_is_configured_and_minimal(ttg in 0.0f64..5_000.0) {
            let model = reference_vessel().to_model(1000.0).unwrap();
            let assessor = RiskAssessor::new(&model);
            let chosen = assessor.select_mode(ttg).unwrap();
            prop_assert!(model.mode(&chosen).is_ok());
            let chosen_risk = assessor.total_risk(ttg, &chosen).unwrap();
            for mode in model.modes() {
                prop_assert!(chosen_risk <= assessor.total_risk(ttg, mode.name()).unwrap());
            }
        }

        #[test]
        fn total_risk_linear_in_cost_sum(ttg in 0.0f64..3_000.0, factor in 0.0f64..50.0) {
            let model = reference_vessel().to_model(1000.0).unwrap();
            let scaled = model.with_costs(model.costs().scaled(factor)).unwrap();
            for mode in model.modes() {
                let base = RiskAssessor::new(&model).total_risk(ttg, mode.name()).unwrap();
                let grown = RiskAssessor::new(&scaled).total_risk(ttg, mode.name()).unwrap();
                prop_assert!((grown - factor * base).abs() <= 1e-9 * (1.0 + grown.abs()));
            }
        }

        #[test]
        fn probabilities_stay_in_unit_interval(ttg in 0.0f64..10_000.0) {
            let model = reference_vessel().to_model(1000.0).unwrap();
            let assessor = RiskAssessor::new(&model);
            for mode in model.modes() {
                let r = assessor.assess(ttg, mode.name()).unwrap();
                for p in [r.failure_probability, r.recovery_failure_probability, r.grounding_probability] {
                    prop_assert!((0.0..=1.0).contains(&p));
                }
            }
        }
    }
}
