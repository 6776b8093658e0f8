//! Built-in reference vessel.
//!
//! A mechanical-drive vessel with a main engine (ME), two diesel generators
//! (DG1, DG2) and a shaft generator/motor (HSG), operable in three modes:
//!
//! - `PTO` (power take-off): restart ME, or start DG1 and HSG, or start DG2 and HSG.
//! - `MEC` (mechanical): restart ME or start HSG.
//! - `PTI` (power take-in): restart DG1 or restart DG2 or start ME.

use serde_json::{Map, Value};

use crate::model::document::{CostRecord, EngineRecord, ModeRecord, ModelDocument, StepRecord};

/// The reference vessel as an editable model document.
#[must_use]
pub fn reference_vessel() -> ModelDocument {
    let mut ship = Map::new();
    ship.insert("ship_model".to_string(), Value::from("Reference PTO/PTI vessel"));

    ModelDocument {
        ship_configuration: ship,
        grounding_cost: CostRecord {
            ship_damage: 100_000.0,
            environment: 50_000.0,
            cargo: 200_000.0,
            infrastructure: 150_000.0,
            reputation: 10_000.0,
            recovery: None,
        },
        engines: vec![
            engine("ME", 3e-9, 50.0, 0.4),
            engine("DG1", 6e-9, 35.0, 0.5),
            engine("DG2", 6e-9, 35.0, 0.5),
            engine("HSG", 2e-9, 12.0, 1.0),
        ],
        modes: vec![
            mode(
                "PTO",
                &[
                    ("Restart ME", "Terminate"),
                    ("Start DG1", "AND"),
                    ("Start HSG", "Terminate"),
                    ("Start DG2", "AND"),
                    ("Start HSG", "Terminate"),
                ],
            ),
            mode("MEC", &[("Restart ME", "OR"), ("Start HSG", "Terminate")]),
            mode(
                "PTI",
                &[
                    ("Restart DG1", "OR"),
                    ("Restart DG2", "OR"),
                    ("Start ME", "Terminate"),
                ],
            ),
        ],
    }
}

fn engine(name: &str, failure_rate: f64, start_time: f64, restart_probability: f64) -> EngineRecord {
    EngineRecord {
        engine_name: name.to_string(),
        failure_rate,
        start_time,
        restart_probability,
    }
}

fn mode(name: &str, steps: &[(&str, &str)]) -> ModeRecord {
    ModeRecord {
        mode_name: name.to_string(),
        scenarios: steps
            .iter()
            .map(|(action, operation)| StepRecord {
                action: (*action).to_string(),
                operation: (*operation).to_string(),
            })
            .collect(),
    }
}
