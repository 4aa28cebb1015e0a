use std::fmt;
use thiserror::Error;

/// A single pipeline stage that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageViolation {
    pub stage: String,
    pub reason: String,
}

impl StageViolation {
    pub fn new(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StageViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Environment error: {0}")]
    EnvironmentError(String),

    #[error("Missing secret '{name}'{}", network_suffix(.network))]
    MissingSecret {
        name: String,
        network: Option<String>,
    },

    #[error("Malformed secret '{name}'{}: {reason}", network_suffix(.network))]
    MalformedSecret {
        name: String,
        network: Option<String>,
        reason: String,
    },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Network already registered: {0}")]
    DuplicateNetwork(String),

    #[error("Invalid network '{name}': {reason}")]
    InvalidNetwork { name: String, reason: String },

    #[error("Invalid optimizer configuration: {0}")]
    InvalidOptimizerConfig(String),

    #[error("Unknown pipeline stage: {0}")]
    UnknownStage(String),

    #[error("Pipeline validation failed: {}", join_violations(.0))]
    Stages(Vec<StageViolation>),

    #[error("Chain id mismatch on '{network}': configured {expected}, endpoint reports {actual}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
}

/// Coarse classification of a [`ConfigError`], stable for callers that
/// branch on the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Source,
    MissingSecret,
    MalformedSecret,
    UnknownNetwork,
    DuplicateNetwork,
    InvalidNetwork,
    InvalidOptimizerConfig,
    UnknownStage,
    Stages,
    ChainIdMismatch,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io(_)
            | ConfigError::Json(_)
            | ConfigError::Toml(_)
            | ConfigError::InvalidFormat(_)
            | ConfigError::FileNotFound(_)
            | ConfigError::EnvironmentError(_) => ErrorKind::Source,
            ConfigError::MissingSecret { .. } => ErrorKind::MissingSecret,
            ConfigError::MalformedSecret { .. } => ErrorKind::MalformedSecret,
            ConfigError::UnknownNetwork(_) => ErrorKind::UnknownNetwork,
            ConfigError::DuplicateNetwork(_) => ErrorKind::DuplicateNetwork,
            ConfigError::InvalidNetwork { .. } => ErrorKind::InvalidNetwork,
            ConfigError::InvalidOptimizerConfig(_) => ErrorKind::InvalidOptimizerConfig,
            ConfigError::UnknownStage(_) => ErrorKind::UnknownStage,
            ConfigError::Stages(_) => ErrorKind::Stages,
            ConfigError::ChainIdMismatch { .. } => ErrorKind::ChainIdMismatch,
        }
    }

    /// Attach the network being resolved to a credential failure.
    pub(crate) fn for_network(self, network: &str) -> Self {
        match self {
            ConfigError::MissingSecret { name, .. } => ConfigError::MissingSecret {
                name,
                network: Some(network.to_string()),
            },
            ConfigError::MalformedSecret { name, reason, .. } => ConfigError::MalformedSecret {
                name,
                network: Some(network.to_string()),
                reason,
            },
            other => other,
        }
    }
}

fn network_suffix(network: &Option<String>) -> String {
    match network {
        Some(network) => format!(" required by network '{}'", network),
        None => String::new(),
    }
}

fn join_violations(violations: &[StageViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ConfigResult<T> = Result<T, ConfigError>;
