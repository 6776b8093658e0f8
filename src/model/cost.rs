//! Cost of a grounding, broken into its five components.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::errors::{Result, RiskError};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostVector {
    pub ship_damage: f64,
    pub environmental_damage: f64,
    pub cargo_loss: f64,
    pub infrastructure_damage: f64,
    pub reputational_damage: f64,
}

impl CostVector {
    /// Build a validated cost vector; every component finite and >= 0, and so is the sum.
    pub fn new(
        ship_damage: f64,
        environmental_damage: f64,
        cargo_loss: f64,
        infrastructure_damage: f64,
        reputational_damage: f64,
    ) -> Result<Self> {
        let costs = Self {
            ship_damage,
            environmental_damage,
            cargo_loss,
            infrastructure_damage,
            reputational_damage,
        };
        costs.validate()?;
        Ok(costs)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.components() {
            if !value.is_finite() || value < 0.0 {
                return Err(RiskError::invalid(format!(
                    "grounding_cost.{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        let total = self.total();
        if !total.is_finite() {
            return Err(RiskError::invalid(format!(
                "grounding cost sum must be finite, got {total}"
            )));
        }
        Ok(())
    }

    /// Named components in canonical order.
    #[must_use]
    pub fn components(&self) -> [(&'static str, f64); 5] {
        [
            ("ship_damage", self.ship_damage),
            ("environment", self.environmental_damage),
            ("cargo", self.cargo_loss),
            ("infrastructure", self.infrastructure_damage),
            ("reputation", self.reputational_damage),
        ]
    }

    /// Aggregate cost of one grounding.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.components().iter().map(|(_, v)| v).sum()
    }

    /// Every component multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ship_damage: self.ship_damage * factor,
            environmental_damage: self.environmental_damage * factor,
            cargo_loss: self.cargo_loss * factor,
            infrastructure_damage: self.infrastructure_damage * factor,
            reputational_damage: self.reputational_damage * factor,
        }
    }
}
