//! Composition of networks, secrets, compiler and pipeline into a
//! [`ResolvedConfig`].

use crate::config::{
    CompilerProfile, CompilerSettings, PipelineToggle, ProjectDeclaration, ProjectPaths,
    ResolvedStage, Stage, StageParameters, StageSettings, TestSettings,
};
use crate::networks::{NetworkProfile, NetworkRegistry};
use crate::resolved::{ForkTarget, ResolvedConfig, VerificationTarget};
use crate::secrets::{Secret, SecretStore};
use crate::{ConfigError, ConfigResult, StageViolation};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Accumulates validated components and produces a [`ConfigResolver`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    registry: NetworkRegistry,
    secrets: SecretStore,
    compiler: CompilerSettings,
    compiler_profile: CompilerProfile,
    pipeline: PipelineToggle,
    paths: ProjectPaths,
    test: TestSettings,
    default_network: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from a parsed declaration. Networks are registered in
    /// declaration order. Two pipeline entries naming the same stage, such
    /// as `verify` and `verification`, are an error.
    pub fn from_declaration(declaration: ProjectDeclaration) -> ConfigResult<Self> {
        let mut builder = Self::new()
            .compiler(declaration.compiler)
            .paths(declaration.paths)
            .test_settings(declaration.test)
            .networks(declaration.networks)?;

        let mut declared: BTreeMap<Stage, String> = BTreeMap::new();
        let mut collisions = Vec::new();
        for (name, config) in declaration.pipeline {
            let stage: Stage = name.parse()?;
            if let Some(previous) = declared.get(&stage) {
                collisions.push(StageViolation::new(
                    stage.as_str(),
                    format!("declared as both '{}' and '{}'", previous, name),
                ));
                continue;
            }
            builder = builder.stage(&name, config.enabled, config.parameters)?;
            declared.insert(stage, name);
        }
        if !collisions.is_empty() {
            return Err(ConfigError::Stages(collisions));
        }

        if let Some(name) = declaration.default_network {
            builder = builder.default_network(name);
        }

        Ok(builder)
    }

    pub fn network(mut self, profile: NetworkProfile) -> ConfigResult<Self> {
        self.registry.register(profile)?;
        Ok(self)
    }

    pub fn networks<I>(mut self, profiles: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = NetworkProfile>,
    {
        for profile in profiles {
            self.registry.register(profile)?;
        }
        Ok(self)
    }

    pub fn registry(mut self, registry: NetworkRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn secrets(mut self, secrets: SecretStore) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn compiler(mut self, settings: CompilerSettings) -> Self {
        self.compiler = settings;
        self
    }

    pub fn compiler_profile(mut self, profile: CompilerProfile) -> Self {
        self.compiler_profile = profile;
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineToggle) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn stage(mut self, stage: &str, enabled: bool, parameters: StageParameters) -> ConfigResult<Self> {
        self.pipeline.configure(stage, parameters)?;
        self.pipeline.set_enabled(stage, enabled)?;
        Ok(self)
    }

    /// Flip a stage without touching its parameters.
    pub fn toggle_stage(mut self, stage: &str, enabled: bool) -> ConfigResult<Self> {
        self.pipeline.set_enabled(stage, enabled)?;
        Ok(self)
    }

    pub fn paths(mut self, paths: ProjectPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn test_settings(mut self, test: TestSettings) -> Self {
        self.test = test;
        self
    }

    pub fn default_network(mut self, name: impl Into<String>) -> Self {
        self.default_network = Some(name.into());
        self
    }

    pub fn build(self) -> ConfigResolver {
        ConfigResolver {
            registry: self.registry,
            secrets: self.secrets,
            compiler: self.compiler,
            compiler_profile: self.compiler_profile,
            pipeline: self.pipeline,
            paths: self.paths,
            test: self.test,
            default_network: self.default_network,
        }
    }
}

/// Resolves one network plus the shared compiler and pipeline settings into
/// a [`ResolvedConfig`].
#[derive(Debug)]
pub struct ConfigResolver {
    registry: NetworkRegistry,
    secrets: SecretStore,
    compiler: CompilerSettings,
    compiler_profile: CompilerProfile,
    pipeline: PipelineToggle,
    paths: ProjectPaths,
    test: TestSettings,
    default_network: Option<String>,
}

impl ConfigResolver {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn from_declaration(declaration: ProjectDeclaration, secrets: SecretStore) -> ConfigResult<Self> {
        Ok(ConfigBuilder::from_declaration(declaration)?.secrets(secrets).build())
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &PipelineToggle {
        &self.pipeline
    }

    /// The declared default network, or the first registered one.
    pub fn default_network(&self) -> Option<&str> {
        self.default_network
            .as_deref()
            .or_else(|| self.registry.names().next())
    }

    pub fn resolve_default(&self) -> ConfigResult<ResolvedConfig> {
        let name = self
            .default_network()
            .ok_or_else(|| ConfigError::UnknownNetwork("<no networks registered>".to_string()))?;
        self.resolve(name)
    }

    /// Resolve `network`. Either every component checks out and a frozen
    /// config is returned, or nothing is.
    pub fn resolve(&self, network: &str) -> ConfigResult<ResolvedConfig> {
        let profile = self.registry.resolve(network)?;

        let credentials = self.credentials_for(profile)?;
        let fork = self.fork_target(profile)?;

        self.compiler_profile.validate(&self.compiler)?;
        if !self.compiler.optimizer.enabled {
            debug!(runs = self.compiler.optimizer.runs, "Optimizer disabled, runs kept but unused");
        }

        let (stages, mut violations) = self.pipeline.check();
        violations.extend(self.cross_check(&stages));
        if !violations.is_empty() {
            return Err(ConfigError::Stages(violations));
        }

        let verification = self.verification_target(profile, &stages)?;

        let enabled: Vec<&str> = self.pipeline.enabled_stages().map(Stage::as_str).collect();
        info!(
            network = %profile.name,
            chain_id = ?profile.chain_id,
            compiler = %self.compiler.version,
            stages = ?enabled,
            "Resolved configuration"
        );

        Ok(ResolvedConfig::new(
            profile.clone(),
            credentials,
            fork,
            self.compiler.clone(),
            stages,
            verification,
            self.paths.clone(),
            self.test,
        ))
    }

    fn credentials_for(&self, profile: &NetworkProfile) -> ConfigResult<Vec<Secret>> {
        profile
            .accounts
            .iter()
            .map(|account| -> ConfigResult<Secret> {
                let secret = self
                    .secrets
                    .get(account)
                    .map_err(|e| e.for_network(&profile.name))?;
                secret
                    .to_private_key()
                    .map_err(|e| e.for_network(&profile.name))?;
                Ok(secret.clone())
            })
            .collect()
    }

    fn fork_target(&self, profile: &NetworkProfile) -> ConfigResult<Option<ForkTarget>> {
        let fork = match &profile.fork {
            Some(fork) => fork,
            None => return Ok(None),
        };
        let source = self.registry.resolve(&fork.network)?;
        Ok(Some(ForkTarget {
            network: source.name.clone(),
            rpc_url: source.rpc_url.clone(),
            block_number: fork.block_number,
        }))
    }

    /// Checks that need more than the stage's own parameters.
    fn cross_check(&self, stages: &BTreeMap<Stage, ResolvedStage>) -> Vec<StageViolation> {
        let mut violations = Vec::new();

        for (stage, resolved) in stages {
            match &resolved.settings {
                StageSettings::Coverage(settings) => {
                    if let Some(network) = &settings.network {
                        if !network.trim().is_empty() && !self.registry.contains(network) {
                            violations.push(StageViolation::new(
                                stage.as_str(),
                                format!("coverage network '{}' is not registered", network),
                            ));
                        }
                    }
                }
                StageSettings::Verify(settings) if resolved.enabled => {
                    if let Some(key) = &settings.api_key {
                        if !key.trim().is_empty() && !self.secrets.contains(key) {
                            violations.push(StageViolation::new(
                                stage.as_str(),
                                format!("api key secret '{}' is not available", key),
                            ));
                        }
                    }
                }
                StageSettings::GasReport(settings) if resolved.enabled => {
                    if let Some(key) = &settings.coinmarketcap_key {
                        if !key.trim().is_empty() && !self.secrets.contains(key) {
                            violations.push(StageViolation::new(
                                stage.as_str(),
                                format!("price feed secret '{}' is not available", key),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        violations
    }

    fn verification_target(
        &self,
        profile: &NetworkProfile,
        stages: &BTreeMap<Stage, ResolvedStage>,
    ) -> ConfigResult<Option<VerificationTarget>> {
        let resolved = match stages.get(&Stage::Verify) {
            Some(resolved) if resolved.enabled => resolved,
            _ => return Ok(None),
        };
        let settings = match &resolved.settings {
            StageSettings::Verify(settings) => settings,
            _ => return Ok(None),
        };

        let key_name = settings.api_key.as_deref().ok_or_else(|| {
            ConfigError::Stages(vec![StageViolation::new(
                Stage::Verify.as_str(),
                "api_key is required when verification is enabled",
            )])
        })?;
        let api_key = self
            .secrets
            .get(key_name)
            .map_err(|e| e.for_network(&profile.name))?
            .clone();

        Ok(Some(VerificationTarget {
            api_key,
            network_identifier: settings
                .network_identifier
                .clone()
                .unwrap_or_else(|| profile.name.clone()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use serde_json::json;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn params(value: serde_json::Value) -> StageParameters {
        value.as_object().cloned().unwrap_or_default()
    }

    fn resolver_with(secrets: &[(&str, &str)]) -> ConfigBuilder {
        ConfigResolver::builder()
            .network(NetworkProfile::new("local", "http://127.0.0.1:8545"))
            .unwrap()
            .network(
                NetworkProfile::new("testnet", "https://example-testnet")
                    .with_chain_id(97)
                    .with_gas_price(20_000_000_000)
                    .with_account("key1"),
            )
            .unwrap()
            .secrets(SecretStore::from_entries(secrets.iter().copied()).unwrap())
    }

    #[test]
    fn resolves_network_and_credentials() {
        let resolver = resolver_with(&[("key1", KEY)]).build();
        let config = resolver.resolve("testnet").unwrap();

        assert_eq!(config.network_name(), "testnet");
        assert_eq!(config.network().chain_id, Some(97));
        assert_eq!(config.credentials().len(), 1);
        assert_eq!(config.credentials()[0].expose(), KEY);
        assert!(config.verification().is_none());
    }

    #[test]
    fn malformed_account_key_fails() {
        let resolver = resolver_with(&[("key1", "opaque-credential")]).build();
        match resolver.resolve("testnet") {
            Err(err @ ConfigError::MalformedSecret { .. }) => {
                assert!(matches!(
                    &err,
                    ConfigError::MalformedSecret { name, network: Some(network), .. }
                        if name == "key1" && network == "testnet"
                ));
                assert!(err.to_string().contains("testnet"));
                assert!(!err.to_string().contains("opaque-credential"));
            }
            other => panic!("expected MalformedSecret, got {:?}", other),
        }
        // networks without accounts are unaffected
        assert!(resolver.resolve("local").is_ok());
    }

    #[test]
    fn default_network_falls_back_to_first_registered() {
        let resolver = resolver_with(&[]).build();
        assert_eq!(resolver.default_network(), Some("local"));

        let resolver = resolver_with(&[]).default_network("testnet").build();
        assert_eq!(resolver.default_network(), Some("testnet"));

        let empty = ConfigResolver::builder().build();
        assert!(matches!(empty.resolve_default(), Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn verification_target_uses_secret_store() {
        let resolver = resolver_with(&[("key1", KEY), ("bscscan", "BSCSCANKEY")])
            .stage("verify", true, params(json!({ "api_key": "bscscan" })))
            .unwrap()
            .build();

        let config = resolver.resolve("testnet").unwrap();
        let target = config.verification().unwrap();
        assert_eq!(target.api_key.expose(), "BSCSCANKEY");
        assert_eq!(target.network_identifier, "testnet");
    }

    #[test]
    fn cross_component_violations_are_aggregated() {
        let resolver = resolver_with(&[("key1", KEY)])
            .stage("verify", true, params(json!({ "api_key": "missing_key" })))
            .unwrap()
            .stage("coverage", false, params(json!({ "network": "nowhere" })))
            .unwrap()
            .stage("sizeCheck", true, params(json!({ "max_bytes": 0 })))
            .unwrap()
            .build();

        match resolver.resolve("local") {
            Err(ConfigError::Stages(violations)) => {
                let stages: Vec<&str> = violations.iter().map(|v| v.stage.as_str()).collect();
                assert!(stages.contains(&"verify"));
                assert!(stages.contains(&"coverage"));
                assert!(stages.contains(&"sizeCheck"));
            }
            other => panic!("expected aggregated stage errors, got {:?}", other),
        }
    }

    #[test]
    fn stage_aliases_declared_twice_are_rejected() {
        let mut declaration = ProjectDeclaration::default();
        declaration.pipeline.insert(
            "verify".to_string(),
            StageConfig::new(true, params(json!({ "api_key": "explorer" }))),
        );
        declaration
            .pipeline
            .insert("verification".to_string(), StageConfig::new(false, StageParameters::new()));

        match ConfigBuilder::from_declaration(declaration) {
            Err(ConfigError::Stages(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].stage, "verify");
                assert!(violations[0].reason.contains("'verification'"));
            }
            other => panic!("expected stage collision, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn fork_target_points_at_source() {
        let resolver = resolver_with(&[("key1", KEY)])
            .network(NetworkProfile::new("sim", "http://127.0.0.1:8546").with_fork("testnet", Some(123)))
            .unwrap()
            .build();

        let config = resolver.resolve("sim").unwrap();
        let fork = config.fork().unwrap();
        assert_eq!(fork.network, "testnet");
        assert_eq!(fork.rpc_url, "https://example-testnet");
        assert_eq!(fork.block_number, Some(123));
        assert!(config.credentials().is_empty());
    }
}
