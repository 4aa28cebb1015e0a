use super::{CompilerSettings, ProjectPaths, StageConfig, TestSettings};
use crate::networks::{NetworkPreset, NetworkProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Static project declaration as written in `solforge.toml` / `solforge.json`.
///
/// The schema only has room for secret *names*. A credential typed into the
/// declaration is rejected as an unknown field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectDeclaration {
    /// Network used when the invocation does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_network: Option<String>,

    /// Secrets file, relative to the declaration file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_file: Option<PathBuf>,

    /// Networks in registration order; a fork source must come first
    pub networks: Vec<NetworkProfile>,

    pub compiler: CompilerSettings,

    /// Stage name to stage state
    pub pipeline: BTreeMap<String, StageConfig>,

    pub paths: ProjectPaths,

    pub test: TestSettings,
}

impl ProjectDeclaration {
    /// Declaration containing every built-in network preset.
    pub fn with_presets() -> Self {
        Self {
            default_network: Some(NetworkPreset::Localhost.profile().name),
            networks: NetworkPreset::ALL.iter().map(|preset| preset.profile()).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_api_key_is_rejected() {
        let result: Result<ProjectDeclaration, _> = toml::from_str(
            r#"
[etherscan]
apiKey = "BWGG3TB7A6B2ZQXVAGVRYQ7F8XKDAVW9RN"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_declaration_uses_defaults() {
        let declaration: ProjectDeclaration = toml::from_str("").unwrap();
        assert!(declaration.networks.is_empty());
        assert_eq!(declaration.compiler, CompilerSettings::default());
        assert_eq!(declaration.paths, ProjectPaths::default());
        assert_eq!(declaration.test.timeout_ms, 20_000);
    }
}
