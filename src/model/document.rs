//! JSON model document: the exchange format written by the authoring tool.
//!
//! ```json
//! {
//!   "ship_configuration": { "ship_model": "Feeder", "length": "120" },
//!   "grounding_cost": { "ship_damage": 100000, "environment": 50000, ... },
//!   "engines": [
//!     { "engine_name": "ME", "failure_rate": 3e-9, "start_time": 50, "restart_probability": 0.4 }
//!   ],
//!   "modes": [
//!     { "mode_name": "MEC", "scenarios": [ { "action": "Restart Engine 1", "operation": "Terminate" } ] }
//!   ]
//! }
//! ```
//!
//! Numbers may be written as JSON numbers or numeric strings, and the cost
//! section is also accepted under the historic key `grouding_cost`.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::core::errors::{Result, RiskError};
use crate::model::cost::CostVector;
use crate::model::engine::{Engine, EngineRegistry};
use crate::model::mode::{Action, Connective, MachineryMode, Verb};
use crate::model::risk_model::RiskModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Free-form vessel description; not used by the risk formulas.
    #[serde(default)]
    pub ship_configuration: Map<String, Value>,
    #[serde(alias = "grouding_cost")]
    pub grounding_cost: CostRecord,
    #[serde(default)]
    pub engines: Vec<EngineRecord>,
    #[serde(default)]
    pub modes: Vec<ModeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    #[serde(deserialize_with = "lenient_f64")]
    pub ship_damage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub environment: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub cargo: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub infrastructure: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub reputation: f64,
    /// Recorded by the authoring tool; excluded from the cost sum.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub recovery: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRecord {
    pub engine_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub failure_rate: f64,
    /// Recovery duration in seconds.
    #[serde(deserialize_with = "lenient_f64")]
    pub start_time: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub restart_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRecord {
    pub mode_name: String,
    #[serde(default)]
    pub scenarios: Vec<StepRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// `<Start|Restart> <engine-reference>`.
    pub action: String,
    /// `AND`, `OR` or `Terminate`.
    pub operation: String,
}

impl ModelDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RiskError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| RiskError::io(path, source))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RiskError::Serialization {
            context: "model document",
            details: e.to_string(),
        })
    }

    /// Write the document as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut body = self.to_json_pretty()?;
        body.push('\n');
        fs::write(path, body).map_err(|source| RiskError::io(path, source))
    }

    /// SHA-256 over the canonical compact JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self).map_err(|e| RiskError::Serialization {
            context: "model document",
            details: e.to_string(),
        })?;
        let digest = Sha256::digest(&canonical);
        Ok(digest
            .iter()
            .fold(String::with_capacity(64), |mut acc, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            }))
    }

    /// Resolve aliases, validate, and build the immutable model.
    pub fn to_model(&self, scale: f64) -> Result<RiskModel> {
        let engines = self
            .engines
            .iter()
            .map(|rec| {
                Engine::new(
                    rec.engine_name.trim(),
                    rec.failure_rate,
                    rec.start_time,
                    rec.restart_probability,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let registry = EngineRegistry::new(engines)?;

        let grammar = ActionGrammar::compile()?;
        let modes = self
            .modes
            .iter()
            .map(|rec| {
                let steps = rec
                    .scenarios
                    .iter()
                    .map(|step| grammar.parse_step(step, &registry))
                    .collect::<Result<Vec<_>>>()?;
                MachineryMode::from_steps(rec.mode_name.trim(), steps)
            })
            .collect::<Result<Vec<_>>>()?;

        let c = &self.grounding_cost;
        let costs = CostVector::new(
            c.ship_damage,
            c.environment,
            c.cargo,
            c.infrastructure,
            c.reputation,
        )?;
        if let Some(recovery) = c.recovery
            && (!recovery.is_finite() || recovery < 0.0)
        {
            return Err(RiskError::invalid(format!(
                "grounding_cost.recovery must be finite and >= 0, got {recovery}"
            )));
        }

        Ok(RiskModel::new(registry, modes, costs, scale)?
            .with_ship_metadata(self.ship_configuration.clone())
            .with_recovery_cost(c.recovery))
    }

    /// Re-emit a model as a document, referencing engines by declared name.
    #[must_use]
    pub fn from_model(model: &RiskModel) -> Self {
        let costs = model.costs();
        Self {
            ship_configuration: model.ship_metadata().clone(),
            grounding_cost: CostRecord {
                ship_damage: costs.ship_damage,
                environment: costs.environmental_damage,
                cargo: costs.cargo_loss,
                infrastructure: costs.infrastructure_damage,
                reputation: costs.reputational_damage,
                recovery: model.recovery_cost(),
            },
            engines: model
                .engines()
                .iter()
                .map(|e| EngineRecord {
                    engine_name: e.name.clone(),
                    failure_rate: e.failure_rate,
                    start_time: e.recovery_time,
                    restart_probability: e.restart_success_probability,
                })
                .collect(),
            modes: model
                .modes()
                .iter()
                .map(|m| ModeRecord {
                    mode_name: m.name().to_string(),
                    scenarios: m
                        .steps()
                        .map(|a| StepRecord {
                            action: a.label(),
                            operation: a.connective.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Parser for `<Start|Restart> <engine-reference>` action strings.
struct ActionGrammar {
    action: Regex,
}

impl ActionGrammar {
    fn compile() -> Result<Self> {
        let action = Regex::new(r"^\s*(?i:(start|restart))\s+(\S.*?)\s*$").map_err(|err| {
            RiskError::InvalidConfig {
                details: format!("action grammar failed to compile: {err}"),
            }
        })?;
        Ok(Self { action })
    }

    fn parse_step(&self, step: &StepRecord, registry: &EngineRegistry) -> Result<Action> {
        let captures = self
            .action
            .captures(&step.action)
            .ok_or_else(|| RiskError::ConfigParse {
                context: "model document",
                details: format!(
                    "action {:?} is not of the form '<Start|Restart> <engine>'",
                    step.action
                ),
            })?;
        let verb: Verb = captures[1].parse()?;
        let engine = registry.resolve(&captures[2])?;
        let connective: Connective = step.operation.parse()?;
        Ok(Action::new(verb, engine.name.clone(), connective))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("expected a number, got {raw:?}: {e}"))),
    }
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("expected a number, got {raw:?}: {e}"))),
    }
}
