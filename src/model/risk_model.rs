//! The immutable aggregate the risk computations read from.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};

use crate::core::errors::{Result, RiskError};
use crate::model::cost::CostVector;
use crate::model::document::ModelDocument;
use crate::model::engine::EngineRegistry;
use crate::model::mode::MachineryMode;

/// Engines, modes and costs of one vessel, plus the risk scale.
///
/// Constructed once and read-only afterwards; safe to share across threads.
#[derive(Debug, Clone)]
pub struct RiskModel {
    ship: Map<String, Value>,
    engines: EngineRegistry,
    modes: Vec<MachineryMode>,
    costs: CostVector,
    /// Recorded by the authoring tool; not part of the cost sum.
    recovery_cost: Option<f64>,
    scale: f64,
}

impl RiskModel {
    /// Build a validated model.
    ///
    /// Mode names must be unique and every action must reference a registered engine.
    pub fn new(
        engines: EngineRegistry,
        modes: Vec<MachineryMode>,
        costs: CostVector,
        scale: f64,
    ) -> Result<Self> {
        costs.validate()?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RiskError::invalid(format!(
                "risk scale must be finite and > 0, got {scale}"
            )));
        }
        if !(costs.total() * scale).is_finite() {
            return Err(RiskError::invalid(format!(
                "grounding cost sum {} times risk scale {scale} overflows",
                costs.total()
            )));
        }

        let mut names = HashSet::with_capacity(modes.len());
        for mode in &modes {
            if !names.insert(mode.name()) {
                return Err(RiskError::invalid(format!(
                    "duplicate machinery mode name: {}",
                    mode.name()
                )));
            }
            for action in mode.steps() {
                engines.get(&action.engine)?;
            }
        }

        Ok(Self {
            ship: Map::new(),
            engines,
            modes,
            costs,
            recovery_cost: None,
            scale,
        })
    }

    /// Load a model document from disk and build the model from it.
    pub fn from_path(path: &Path, scale: f64) -> Result<Self> {
        ModelDocument::load(path)?.to_model(scale)
    }

    /// Attach free-form ship metadata.
    #[must_use]
    pub fn with_ship_metadata(mut self, ship: Map<String, Value>) -> Self {
        self.ship = ship;
        self
    }

    #[must_use]
    pub fn with_recovery_cost(mut self, recovery_cost: Option<f64>) -> Self {
        self.recovery_cost = recovery_cost;
        self
    }

    pub fn ship_metadata(&self) -> &Map<String, Value> {
        &self.ship
    }

    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    /// Modes in declaration order.
    pub fn modes(&self) -> &[MachineryMode] {
        &self.modes
    }

    pub fn mode(&self, name: &str) -> Result<&MachineryMode> {
        self.modes
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| RiskError::UnknownMode {
                name: name.to_string(),
            })
    }

    pub fn costs(&self) -> &CostVector {
        &self.costs
    }

    pub fn recovery_cost(&self) -> Option<f64> {
        self.recovery_cost
    }

    /// Unit-conversion factor applied to probability × cost.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Same model with a different cost vector.
    pub fn with_costs(&self, costs: CostVector) -> Result<Self> {
        costs.validate()?;
        if !(costs.total() * self.scale).is_finite() {
            return Err(RiskError::invalid(format!(
                "grounding cost sum {} times risk scale {} overflows",
                costs.total(),
                self.scale
            )));
        }
        let mut next = self.clone();
        next.costs = costs;
        Ok(next)
    }
}
