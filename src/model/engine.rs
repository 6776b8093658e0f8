//! Engine reliability parameters and the name/alias registry.

#![allow(missing_docs)]

use std::collections::HashMap;

use serde::Serialize;

use crate::core::errors::{Result, RiskError};

/// One prime mover or generator set and its reliability figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Engine {
    pub name: String,
    /// Probability of spontaneous failure over the assessment horizon.
    pub failure_rate: f64,
    /// Seconds needed to bring the engine online.
    pub recovery_time: f64,
    /// Probability that a restart attempt succeeds once attempted.
    pub restart_success_probability: f64,
}

impl Engine {
    /// Build a validated engine record.
    pub fn new(
        name: impl Into<String>,
        failure_rate: f64,
        recovery_time: f64,
        restart_success_probability: f64,
    ) -> Result<Self> {
        let engine = Self {
            name: name.into(),
            failure_rate,
            recovery_time,
            restart_success_probability,
        };
        engine.validate()?;
        Ok(engine)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RiskError::invalid("engine name must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(RiskError::invalid(format!(
                "engine {}: failure_rate must be in [0,1], got {}",
                self.name, self.failure_rate
            )));
        }
        if !self.recovery_time.is_finite() || self.recovery_time < 0.0 {
            return Err(RiskError::invalid(format!(
                "engine {}: recovery time must be finite and >= 0, got {}",
                self.name, self.recovery_time
            )));
        }
        if !(0.0..=1.0).contains(&self.restart_success_probability) {
            return Err(RiskError::invalid(format!(
                "engine {}: restart probability must be in [0,1], got {}",
                self.name, self.restart_success_probability
            )));
        }
        Ok(())
    }
}

/// Immutable, declaration-ordered set of engines.
///
/// Besides the declared names, every engine answers to a positional alias
/// `Engine N` (1-based, declaration order). The alias table is built once
/// here so nothing downstream parses alias strings.
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    engines: Vec<Engine>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl EngineRegistry {
    /// Build the registry. Names must be unique.
    pub fn new(engines: Vec<Engine>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(engines.len());
        let mut by_alias = HashMap::with_capacity(engines.len());
        for (index, engine) in engines.iter().enumerate() {
            engine.validate()?;
            if by_name.insert(engine.name.clone(), index).is_some() {
                return Err(RiskError::invalid(format!(
                    "duplicate engine name: {}",
                    engine.name
                )));
            }
            by_alias.insert(normalize_alias(&positional_alias(index + 1)), index);
        }
        // A name that spells another engine's alias would make references ambiguous.
        for (index, engine) in engines.iter().enumerate() {
            if let Some(&aliased) = by_alias.get(&normalize_alias(&engine.name))
                && aliased != index
            {
                return Err(RiskError::invalid(format!(
                    "engine name {:?} collides with the positional alias of engine {}",
                    engine.name,
                    aliased + 1
                )));
            }
        }
        Ok(Self {
            engines,
            by_name,
            by_alias,
        })
    }

    /// Look up an engine by its declared name.
    pub fn get(&self, name: &str) -> Result<&Engine> {
        self.by_name
            .get(name)
            .map(|&index| &self.engines[index])
            .ok_or_else(|| RiskError::UnknownEngine {
                name: name.to_string(),
            })
    }

    /// Resolve a scenario reference: declared name first, then `Engine N`.
    pub fn resolve(&self, reference: &str) -> Result<&Engine> {
        let reference = reference.trim();
        if let Some(&index) = self.by_name.get(reference) {
            return Ok(&self.engines[index]);
        }
        self.by_alias
            .get(&normalize_alias(reference))
            .map(|&index| &self.engines[index])
            .ok_or_else(|| RiskError::UnknownEngine {
                name: reference.to_string(),
            })
    }

    /// Engines in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Engine> {
        self.engines.iter()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

/// The alias the authoring tool assigns to the engine at `position` (1-based).
#[must_use]
pub fn positional_alias(position: usize) -> String {
    format!("Engine {position}")
}

fn normalize_alias(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
