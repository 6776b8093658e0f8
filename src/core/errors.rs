//! MSO-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Top-level error type for the grounding-risk engine.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("[MSO-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MSO-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MSO-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MSO-2001] unknown engine: {name}")]
    UnknownEngine { name: String },

    #[error("[MSO-2002] unknown machinery mode: {name}")]
    UnknownMode { name: String },

    #[error("[MSO-2003] probability out of range in {context}: {value}")]
    InvalidProbability { context: String, value: f64 },

    #[error("[MSO-2004] mode selection requested with no machinery modes configured")]
    NoModesConfigured,

    #[error("[MSO-2005] time-to-grounding must be finite and >= 0, got {value}")]
    InvalidTtg { value: f64 },

    #[error("[MSO-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[MSO-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[MSO-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },
}

impl RiskError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "MSO-1001",
            Self::MissingConfig { .. } => "MSO-1002",
            Self::ConfigParse { .. } => "MSO-1003",
            Self::UnknownEngine { .. } => "MSO-2001",
            Self::UnknownMode { .. } => "MSO-2002",
            Self::InvalidProbability { .. } => "MSO-2003",
            Self::NoModesConfigured => "MSO-2004",
            Self::InvalidTtg { .. } => "MSO-2005",
            Self::Serialization { .. } => "MSO-2101",
            Self::Io { .. } => "MSO-3002",
            Self::ChannelClosed { .. } => "MSO-3003",
        }
    }

    /// Whether the failure stems from configuration rather than a computation.
    ///
    /// Configuration errors abort before any risk figure is produced.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::MissingConfig { .. } | Self::ConfigParse { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for configuration validation failures.
    #[must_use]
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(value: serde_json::Error) -> Self {
        if value.is_data() || value.is_syntax() || value.is_eof() {
            Self::ConfigParse {
                context: "serde_json",
                details: value.to_string(),
            }
        } else {
            Self::Serialization {
                context: "serde_json",
                details: value.to_string(),
            }
        }
    }
}

impl From<toml::de::Error> for RiskError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
