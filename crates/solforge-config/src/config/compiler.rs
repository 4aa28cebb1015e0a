use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Released solc versions as `(minor, first patch, last patch)` for the
/// `0.x` series.
const SOLC_RELEASES: [(u32, u32, u32); 5] = [(4, 11, 26), (5, 0, 17), (6, 0, 12), (7, 0, 6), (8, 0, 28)];

/// Compiler version and optimizer settings handed to the compiler backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSettings {
    /// Exact solc release, e.g. `0.8.10`
    pub version: String,

    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSettings {
    pub enabled: bool,

    /// Expected number of executions per opcode. Kept even while the
    /// optimizer is disabled.
    pub runs: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: 200,
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            version: "0.8.10".to_string(),
            optimizer: OptimizerSettings {
                enabled: true,
                runs: 200,
            },
        }
    }
}

impl CompilerSettings {
    pub fn new(version: impl Into<String>, optimizer_enabled: bool, optimizer_runs: u32) -> Self {
        Self {
            version: version.into(),
            optimizer: OptimizerSettings {
                enabled: optimizer_enabled,
                runs: optimizer_runs,
            },
        }
    }

    /// Runs the compiler should actually use; `None` while the optimizer is
    /// off.
    pub fn effective_runs(&self) -> Option<u32> {
        self.optimizer.enabled.then_some(self.optimizer.runs)
    }
}

/// Validates [`CompilerSettings`] against the releases a backend supports.
#[derive(Debug, Clone)]
pub struct CompilerProfile {
    supported: Vec<String>,
}

impl Default for CompilerProfile {
    fn default() -> Self {
        let supported = SOLC_RELEASES
            .iter()
            .flat_map(|&(minor, first, last)| (first..=last).map(move |patch| format!("0.{}.{}", minor, patch)))
            .collect();
        Self { supported }
    }
}

impl CompilerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for a backend that ships a specific set of releases.
    pub fn with_supported_versions<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: versions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supports(&self, version: &str) -> bool {
        self.supported.iter().any(|supported| supported == version)
    }

    pub fn supported_versions(&self) -> &[String] {
        &self.supported
    }

    pub fn latest(&self) -> Option<&str> {
        self.supported.last().map(String::as_str)
    }

    pub fn validate(&self, settings: &CompilerSettings) -> ConfigResult<()> {
        if !self.supports(&settings.version) {
            return Err(ConfigError::InvalidOptimizerConfig(format!(
                "compiler version '{}' is not supported",
                settings.version
            )));
        }

        if settings.optimizer.enabled && settings.optimizer.runs == 0 {
            return Err(ConfigError::InvalidOptimizerConfig(
                "optimizer runs must be positive when the optimizer is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_releases_are_supported() {
        let profile = CompilerProfile::new();
        for version in ["0.4.11", "0.5.17", "0.6.12", "0.7.6", "0.8.10", "0.8.28"] {
            assert!(profile.supports(version), "{} should be supported", version);
        }
        for version in ["0.4.10", "0.6.13", "0.9.0", "0.8", "v0.8.10", "0.8.010"] {
            assert!(!profile.supports(version), "{} should not be supported", version);
        }
        assert_eq!(profile.latest(), Some("0.8.28"));
    }

    #[test]
    fn unsupported_version_fails_eagerly() {
        let result = CompilerProfile::new().validate(&CompilerSettings::new("0.9.1", true, 200));
        assert!(matches!(result, Err(ConfigError::InvalidOptimizerConfig(_))));
    }

    #[test]
    fn zero_runs_only_matter_when_enabled() {
        let profile = CompilerProfile::new();
        assert!(profile.validate(&CompilerSettings::new("0.8.10", true, 0)).is_err());
        assert!(profile.validate(&CompilerSettings::new("0.8.10", false, 0)).is_ok());
    }

    #[test]
    fn disabled_optimizer_keeps_runs() {
        let settings = CompilerSettings::new("0.8.10", false, 200);
        assert!(CompilerProfile::new().validate(&settings).is_ok());
        assert_eq!(settings.effective_runs(), None);
        assert_eq!(settings.optimizer.runs, 200);

        let reenabled = CompilerSettings {
            optimizer: OptimizerSettings {
                enabled: true,
                ..settings.optimizer
            },
            ..settings
        };
        assert_eq!(reenabled.effective_runs(), Some(200));
    }

    #[test]
    fn custom_backend_releases() {
        let profile = CompilerProfile::with_supported_versions(["0.8.19"]);
        assert!(profile.validate(&CompilerSettings::new("0.8.19", true, 1)).is_ok());
        assert!(profile.validate(&CompilerSettings::new("0.8.10", true, 1)).is_err());
    }
}
