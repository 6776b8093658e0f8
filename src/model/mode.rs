//! Machinery modes and their recovery chains.
//!
//! A mode owns an ordered list of [`RecoveryChain`]s. Each chain is a run of
//! [`Action`]s linked by [`Connective`]s and closed by exactly one
//! `Terminate`. Inside a chain `AND` binds tighter than `OR`:
//! `A AND B OR C` reads as `(A ∧ B) ∨ C`, each `OR` opening an independent
//! branch that starts from a fresh product.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::errors::{Result, RiskError};

/// What is done to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verb {
    /// Cold start; succeeds if it completes in time.
    Start,
    /// Restart; the restart mechanism must also succeed.
    Restart,
}

/// How an action links to the next one in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Connective {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    Terminate,
}

/// One step of a recovery chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Declared name of the engine acted upon.
    pub engine: String,
    pub verb: Verb,
    pub connective: Connective,
}

impl Action {
    pub fn new(verb: Verb, engine: impl Into<String>, connective: Connective) -> Self {
        Self {
            engine: engine.into(),
            verb,
            connective,
        }
    }

    /// Human-readable action string, e.g. `Restart ME`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.verb, self.engine)
    }
}

/// One independent recovery strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryChain {
    actions: Vec<Action>,
}

impl RecoveryChain {
    /// Build a chain. It must be non-empty and end at its only `Terminate`.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        let Some(last) = actions.last() else {
            return Err(RiskError::invalid("recovery chain must contain at least one action"));
        };
        if last.connective != Connective::Terminate {
            return Err(RiskError::invalid(format!(
                "recovery chain ending at {:?} is not terminated",
                last.label()
            )));
        }
        let terminators = actions
            .iter()
            .filter(|a| a.connective == Connective::Terminate)
            .count();
        if terminators != 1 {
            return Err(RiskError::invalid(
                "recovery chain must terminate exactly once, at its final action",
            ));
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// `OR`-separated branches, each a run of `AND`-joined actions.
    pub fn branches(&self) -> impl Iterator<Item = &[Action]> {
        self.actions
            .split_inclusive(|a| a.connective != Connective::And)
    }
}

/// A named machinery set-up and operating mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineryMode {
    name: String,
    chains: Vec<RecoveryChain>,
}

impl MachineryMode {
    pub fn new(name: impl Into<String>, chains: Vec<RecoveryChain>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RiskError::invalid("machinery mode name must not be empty"));
        }
        Ok(Self { name, chains })
    }

    /// Split a flat step list into chains at every `Terminate`.
    ///
    /// Steps left over after the last `Terminate` are rejected.
    pub fn from_steps(name: impl Into<String>, steps: Vec<Action>) -> Result<Self> {
        let name = name.into();
        let mut chains = Vec::new();
        let mut pending = Vec::new();
        for step in steps {
            let closes = step.connective == Connective::Terminate;
            pending.push(step);
            if closes {
                chains.push(RecoveryChain::new(std::mem::take(&mut pending))?);
            }
        }
        if !pending.is_empty() {
            return Err(RiskError::invalid(format!(
                "mode {name}: {} trailing step(s) after the last Terminate",
                pending.len()
            )));
        }
        Self::new(name, chains)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chains(&self) -> &[RecoveryChain] {
        &self.chains
    }

    /// All actions across chains, in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = &Action> {
        self.chains.iter().flat_map(|c| c.actions().iter())
    }

    /// Distinct engines referenced by this mode, first-seen order.
    pub fn relevant_engines(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.steps()
            .map(|a| a.engine.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("Start"),
            Self::Restart => f.write_str("Restart"),
        }
    }
}

impl FromStr for Verb {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "restart" => Ok(Self::Restart),
            other => Err(RiskError::ConfigParse {
                context: "action verb",
                details: format!("expected Start or Restart, got {other:?}"),
            }),
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
            Self::Terminate => f.write_str("Terminate"),
        }
    }
}

impl FromStr for Connective {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "terminate" => Ok(Self::Terminate),
            other => Err(RiskError::ConfigParse {
                context: "operation",
                details: format!("expected AND, OR or Terminate, got {other:?}"),
            }),
        }
    }
}
