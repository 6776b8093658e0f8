//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use mso_risk::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, RiskError};

// Model
pub use crate::model::cost::CostVector;
pub use crate::model::document::ModelDocument;
pub use crate::model::engine::{Engine, EngineRegistry};
pub use crate::model::mode::{Action, Connective, MachineryMode, RecoveryChain, Verb};
pub use crate::model::presets::reference_vessel;
pub use crate::model::risk_model::RiskModel;

// Assessment
pub use crate::assessment::recovery::recovery_probability;
pub use crate::assessment::risk::{ModeRisk, ModeSelection, RiskAssessor};
pub use crate::assessment::scenario::ScenarioEvaluator;
pub use crate::assessment::sweep::{SweepPlan, SweepReport, SweepRunner};
