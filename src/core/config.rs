//! Run configuration: TOML file + env var overrides + smart defaults.
//!
//! This governs how the engine is driven (risk scale, sweep grid, worker
//! count, activity log). The vessel itself is described by the model
//! document, see [`crate::model::document`].

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, RiskError};

/// Full run configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub risk: RiskConfig,
    pub sweep: SweepConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Risk aggregation knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Unit-conversion factor applied to `grounding probability × cost sum`.
    ///
    /// The data-driven prototype used 1000 and the hand-coded one 100; the
    /// default follows the data-driven one.
    pub scale: f64,
}

/// TTG sweep grid and worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// First TTG sample (seconds).
    pub start_ttg: f64,
    /// Last TTG sample (seconds), inclusive.
    pub end_ttg: f64,
    /// Number of evenly spaced samples.
    pub samples: usize,
    /// Worker threads used to evaluate samples.
    pub parallelism: usize,
}

/// JSONL activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    /// Model document used when a command is not given one explicitly.
    pub model_file: Option<PathBuf>,
    pub jsonl_log: PathBuf,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { scale: 1000.0 }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_ttg: 0.0,
            end_ttg: 2000.0,
            samples: 100,
            parallelism: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 16 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        Self {
            config_file: home_dir.join(".config").join("msor").join("config.toml"),
            model_file: None,
            jsonl_log: home_dir
                .join(".local")
                .join("share")
                .join("msor")
                .join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| RiskError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(RiskError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MSO_RISK_SCALE") {
            self.risk.scale = parse_env("MSO_RISK_SCALE", &raw)?;
        }

        if let Some(raw) = lookup("MSO_SWEEP_START_TTG") {
            self.sweep.start_ttg = parse_env("MSO_SWEEP_START_TTG", &raw)?;
        }
        if let Some(raw) = lookup("MSO_SWEEP_END_TTG") {
            self.sweep.end_ttg = parse_env("MSO_SWEEP_END_TTG", &raw)?;
        }
        if let Some(raw) = lookup("MSO_SWEEP_SAMPLES") {
            self.sweep.samples = parse_env("MSO_SWEEP_SAMPLES", &raw)?;
        }
        if let Some(raw) = lookup("MSO_SWEEP_PARALLELISM") {
            self.sweep.parallelism = parse_env("MSO_SWEEP_PARALLELISM", &raw)?;
        }

        if let Some(raw) = lookup("MSO_LOGGING_ENABLED") {
            self.logging.enabled = parse_env("MSO_LOGGING_ENABLED", &raw)?;
        }

        if let Some(raw) = lookup("MSO_MODEL_FILE") {
            self.paths.model_file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("MSO_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.risk.scale.is_finite() || self.risk.scale <= 0.0 {
            return Err(RiskError::invalid(format!(
                "risk.scale must be finite and > 0, got {}",
                self.risk.scale
            )));
        }

        let sweep = &self.sweep;
        if !sweep.start_ttg.is_finite() || sweep.start_ttg < 0.0 {
            return Err(RiskError::invalid(format!(
                "sweep.start_ttg must be finite and >= 0, got {}",
                sweep.start_ttg
            )));
        }
        if !sweep.end_ttg.is_finite() || sweep.end_ttg < sweep.start_ttg {
            return Err(RiskError::invalid(format!(
                "sweep.end_ttg ({}) must be finite and >= sweep.start_ttg ({})",
                sweep.end_ttg, sweep.start_ttg
            )));
        }
        if sweep.samples == 0 {
            return Err(RiskError::invalid("sweep.samples must be >= 1"));
        }
        if sweep.parallelism == 0 {
            return Err(RiskError::invalid("sweep.parallelism must be >= 1"));
        }

        if self.logging.enabled && self.logging.max_size_bytes == 0 {
            return Err(RiskError::invalid(
                "logging.max_size_bytes must be > 0 when logging is enabled",
            ));
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| RiskError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
