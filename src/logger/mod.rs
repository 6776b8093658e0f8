//! Structured activity logging (JSONL, append-only, graceful degradation).

pub mod jsonl;

use crate::core::config::Config;
use jsonl::{JsonlConfig, JsonlWriter};

/// Open the activity log described by `config`, or `None` when disabled.
pub fn open_activity_log(config: &Config) -> Option<JsonlWriter> {
    config
        .logging
        .enabled
        .then(|| JsonlWriter::open(JsonlConfig::from_config(config)))
}
