//! The frozen result of resolution and the views handed to collaborators.

use crate::config::{CompilerSettings, ProjectPaths, ResolvedStage, Stage, TestSettings};
use crate::networks::NetworkProfile;
use crate::secrets::Secret;
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Upstream endpoint a local simulation network forks from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkTarget {
    pub network: String,
    pub rpc_url: String,
    pub block_number: Option<u64>,
}

/// Parameters for the compiler backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInput {
    pub version: String,
    pub optimizer_enabled: bool,
    pub optimizer_runs: u32,
    pub source_root: PathBuf,
}

/// Parameters for the connection and broadcast layer.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub network: String,
    pub rpc_url: String,
    pub chain_id: Option<u64>,
    pub gas_price: Option<u64>,
    pub gas_limit: Option<u64>,
    pub credentials: Vec<Secret>,
    pub fork: Option<ForkTarget>,
}

impl ConnectionParams {
    /// Compare the configured chain id with the one the endpoint reports.
    ///
    /// Resolution performs no network I/O, so the connection layer calls this
    /// once it has talked to the endpoint. Profiles without a chain id accept
    /// any chain.
    pub fn check_chain_id(&self, reported: u64) -> ConfigResult<()> {
        match self.chain_id {
            Some(expected) if expected != reported => Err(ConfigError::ChainIdMismatch {
                network: self.network.clone(),
                expected,
                actual: reported,
            }),
            _ => Ok(()),
        }
    }
}

/// Parameters for the block explorer verification service.
#[derive(Debug, Clone)]
pub struct VerificationTarget {
    pub api_key: Secret,
    pub network_identifier: String,
}

#[derive(Debug)]
struct Resolved {
    network: NetworkProfile,
    credentials: Vec<Secret>,
    fork: Option<ForkTarget>,
    compiler: CompilerSettings,
    stages: BTreeMap<Stage, ResolvedStage>,
    verification: Option<VerificationTarget>,
    paths: ProjectPaths,
    test: TestSettings,
}

/// Validated configuration for one invocation.
///
/// Immutable once built. Clones share the same allocation, so it can be
/// handed to any number of consumers or threads.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    inner: Arc<Resolved>,
}

impl ResolvedConfig {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        network: NetworkProfile,
        credentials: Vec<Secret>,
        fork: Option<ForkTarget>,
        compiler: CompilerSettings,
        stages: BTreeMap<Stage, ResolvedStage>,
        verification: Option<VerificationTarget>,
        paths: ProjectPaths,
        test: TestSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Resolved {
                network,
                credentials,
                fork,
                compiler,
                stages,
                verification,
                paths,
                test,
            }),
        }
    }

    pub fn network_name(&self) -> &str {
        &self.inner.network.name
    }

    pub fn network(&self) -> &NetworkProfile {
        &self.inner.network
    }

    /// Dereferenced account secrets, in declaration order.
    pub fn credentials(&self) -> &[Secret] {
        &self.inner.credentials
    }

    pub fn fork(&self) -> Option<&ForkTarget> {
        self.inner.fork.as_ref()
    }

    pub fn compiler(&self) -> &CompilerSettings {
        &self.inner.compiler
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.inner.paths
    }

    pub fn test_settings(&self) -> &TestSettings {
        &self.inner.test
    }

    pub fn stage(&self, stage: Stage) -> &ResolvedStage {
        // resolution always produces an entry for every stage
        &self.inner.stages[&stage]
    }

    pub fn stages(&self) -> impl Iterator<Item = (Stage, &ResolvedStage)> {
        self.inner.stages.iter().map(|(&stage, resolved)| (stage, resolved))
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.stage(stage).enabled
    }

    /// Only present when the verify stage is enabled.
    pub fn verification(&self) -> Option<&VerificationTarget> {
        self.inner.verification.as_ref()
    }

    pub fn compiler_input(&self) -> CompilerInput {
        let compiler = &self.inner.compiler;
        CompilerInput {
            version: compiler.version.clone(),
            optimizer_enabled: compiler.optimizer.enabled,
            optimizer_runs: compiler.optimizer.runs,
            source_root: self.inner.paths.sources.clone(),
        }
    }

    pub fn connection(&self) -> ConnectionParams {
        let network = &self.inner.network;
        ConnectionParams {
            network: network.name.clone(),
            rpc_url: network.rpc_url.clone(),
            chain_id: network.chain_id,
            gas_price: network.gas_price,
            gas_limit: network.gas_limit,
            credentials: self.inner.credentials.clone(),
            fork: self.inner.fork.clone(),
        }
    }

    /// Human readable summary. Secret values are never included.
    pub fn report(&self) -> String {
        let inner = &self.inner;
        let network = &inner.network;
        let mut report = String::new();

        let optional = |value: Option<u64>| match value {
            Some(value) => value.to_string(),
            None => "-".to_string(),
        };

        let _ = writeln!(report, "Network: {}", network.name);
        let _ = writeln!(report, "  RPC URL: {}", network.rpc_url);
        let _ = writeln!(report, "  Chain ID: {}", optional(network.chain_id));
        let _ = writeln!(report, "  Gas Price (wei): {}", optional(network.gas_price));
        let _ = writeln!(report, "  Gas Limit: {}", optional(network.gas_limit));
        let _ = writeln!(report, "  Accounts: {}", inner.credentials.len());
        if let Some(fork) = &inner.fork {
            let _ = writeln!(
                report,
                "  Fork: {} ({}) at block {}",
                fork.network,
                fork.rpc_url,
                optional(fork.block_number)
            );
        }

        let _ = writeln!(report, "\nCompiler:");
        let _ = writeln!(report, "  Version: {}", inner.compiler.version);
        let _ = writeln!(
            report,
            "  Optimizer: {} ({} runs)",
            if inner.compiler.optimizer.enabled { "enabled" } else { "disabled" },
            inner.compiler.optimizer.runs
        );

        let _ = writeln!(report, "\nPipeline:");
        for (stage, resolved) in &inner.stages {
            let _ = writeln!(
                report,
                "  {}: {}",
                stage,
                if resolved.enabled { "enabled" } else { "disabled" }
            );
        }
        if let Some(verification) = &inner.verification {
            let _ = writeln!(
                report,
                "  Verification network: {}",
                verification.network_identifier
            );
        }

        let _ = writeln!(report, "\nPaths:");
        let _ = writeln!(report, "  Sources: {}", inner.paths.sources.display());
        let _ = writeln!(report, "  Tests: {}", inner.paths.tests.display());
        let _ = writeln!(report, "  Cache: {}", inner.paths.cache.display());
        let _ = writeln!(report, "  Artifacts: {}", inner.paths.artifacts.display());
        let _ = writeln!(report, "  Test timeout: {}ms", inner.test.timeout_ms);

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn resolved_config_is_shareable() {
        assert_send_sync::<ResolvedConfig>();
    }

    #[test]
    fn chain_id_checked_only_when_configured() {
        let mut params = ConnectionParams {
            network: "testnet".to_string(),
            rpc_url: "https://example-testnet".to_string(),
            chain_id: Some(97),
            gas_price: None,
            gas_limit: None,
            credentials: Vec::new(),
            fork: None,
        };

        assert!(params.check_chain_id(97).is_ok());
        assert!(matches!(
            params.check_chain_id(56),
            Err(ConfigError::ChainIdMismatch { expected: 97, actual: 56, .. })
        ));

        params.chain_id = None;
        assert!(params.check_chain_id(56).is_ok());
    }
}
