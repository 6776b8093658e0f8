//! Vessel model: engines, machinery modes, recovery chains, costs.

pub mod cost;
pub mod document;
pub mod engine;
pub mod mode;
pub mod presets;
pub mod risk_model;
