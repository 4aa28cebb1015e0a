use crate::resolver::ConfigBuilder;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Selects the network to resolve
pub const NETWORK_VAR: &str = "SOLFORGE_NETWORK";
/// Points at the secrets file
pub const SECRETS_VAR: &str = "SOLFORGE_SECRETS";
/// Prefix for per-stage switches, e.g. `SOLFORGE_STAGE_GAS_REPORT=on`
pub const STAGE_VAR_PREFIX: &str = "SOLFORGE_STAGE_";

/// Overrides taken from environment variables. They sit above the
/// declaration file and below explicit command line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub network: Option<String>,
    pub secrets_file: Option<PathBuf>,
    /// `(stage name, enabled)` in the order the variables were seen
    pub stages: Vec<(String, bool)>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(process_vars(is_override_var)?)
    }

    /// Read overrides from an explicit variable list
    pub fn from_vars<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::default();

        for (key, value) in vars {
            if key == NETWORK_VAR {
                if value.trim().is_empty() {
                    return Err(ConfigError::EnvironmentError(format!("{} cannot be empty", NETWORK_VAR)));
                }
                overrides.network = Some(value);
            } else if key == SECRETS_VAR {
                overrides.secrets_file = Some(PathBuf::from(value));
            } else if let Some(stage) = key.strip_prefix(STAGE_VAR_PREFIX) {
                let enabled = parse_switch(&value)
                    .ok_or_else(|| ConfigError::EnvironmentError(format!("Invalid {}: {}", key, value)))?;
                overrides.stages.push((stage.to_string(), enabled));
            }
        }

        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self.network.is_none() && self.secrets_file.is_none() && self.stages.is_empty()
    }

    /// Apply the network choice and stage switches. Stage parameters are
    /// left as declared.
    pub fn apply(&self, mut builder: ConfigBuilder) -> ConfigResult<ConfigBuilder> {
        if let Some(network) = &self.network {
            builder = builder.default_network(network.clone());
        }
        for (stage, enabled) in &self.stages {
            builder = builder.toggle_stage(stage, *enabled)?;
        }
        Ok(builder)
    }
}

fn is_override_var(key: &str) -> bool {
    key == NETWORK_VAR || key == SECRETS_VAR || key.starts_with(STAGE_VAR_PREFIX)
}

/// Process environment entries accepted by `wanted`.
///
/// Entries whose name is not Unicode are skipped. A wanted entry whose value
/// is not Unicode is an error.
pub(crate) fn process_vars<F>(wanted: F) -> ConfigResult<Vec<(String, String)>>
where
    F: Fn(&str) -> bool,
{
    unicode_vars(env::vars_os(), wanted)
}

fn unicode_vars<I, F>(vars: I, wanted: F) -> ConfigResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
    F: Fn(&str) -> bool,
{
    let mut selected = Vec::new();
    for (key, value) in vars {
        let key = match key.into_string() {
            Ok(key) if wanted(&key) => key,
            _ => continue,
        };
        let value = value
            .into_string()
            .map_err(|_| ConfigError::EnvironmentError(format!("{} is not valid Unicode", key)))?;
        selected.push((key, value));
    }
    Ok(selected)
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
