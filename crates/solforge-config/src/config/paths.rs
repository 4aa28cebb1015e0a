use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project directory layout. Passed through to collaborators untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectPaths {
    /// Contract sources
    pub sources: PathBuf,
    /// Test suites
    pub tests: PathBuf,
    /// Compiler cache
    pub cache: PathBuf,
    /// Build artifacts
    pub artifacts: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("./contracts"),
            tests: PathBuf::from("./test"),
            cache: PathBuf::from("./cache"),
            artifacts: PathBuf::from("./artifacts"),
        }
    }
}

/// Test runner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestSettings {
    /// Per-test timeout in milliseconds
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self { timeout_ms: 20_000 }
    }
}
