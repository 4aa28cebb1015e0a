//! Optional build/deploy pipeline stages.
//!
//! Every stage carries an enabled flag and a raw parameter map. Parameters
//! survive disabling, so switching a stage back on restores what was
//! configured before. Typed settings are produced only by [`PipelineToggle::validate`].

use crate::{ConfigError, ConfigResult, StageViolation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Raw, stage-specific options as declared.
pub type StageParameters = serde_json::Map<String, serde_json::Value>;

/// EIP-170 contract size limit in bytes.
pub const DEFAULT_MAX_CONTRACT_BYTES: u64 = 24_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    GasReport,
    SizeCheck,
    Coverage,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::GasReport, Stage::SizeCheck, Stage::Coverage, Stage::Verify];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::GasReport => "gasReport",
            Stage::SizeCheck => "sizeCheck",
            Stage::Coverage => "coverage",
            Stage::Verify => "verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    /// Accepts camelCase, kebab-case and snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "gasreport" | "gasreporter" => Ok(Stage::GasReport),
            "sizecheck" | "contractsizer" => Ok(Stage::SizeCheck),
            "coverage" => Ok(Stage::Coverage),
            "verify" | "verification" => Ok(Stage::Verify),
            _ => Err(ConfigError::UnknownStage(s.to_string())),
        }
    }
}

/// Declared state of one stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub parameters: StageParameters,
}

impl StageConfig {
    pub fn new(enabled: bool, parameters: StageParameters) -> Self {
        Self { enabled, parameters }
    }
}

/// Gas usage report priced in a fiat currency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GasReportSettings {
    /// Three-letter currency code
    pub currency: String,

    /// Gas price in gwei used for the conversion
    #[serde(alias = "gasPrice")]
    pub gas_price: f64,

    /// Secret holding the price-feed API key
    #[serde(alias = "coinmarketcap")]
    pub coinmarketcap_key: Option<String>,

    #[serde(alias = "outputFile")]
    pub output_file: Option<PathBuf>,
}

impl Default for GasReportSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            gas_price: 50.0,
            coinmarketcap_key: None,
            output_file: None,
        }
    }
}

/// Deployed bytecode size enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeCheckSettings {
    #[serde(alias = "maxBytes")]
    pub max_bytes: u64,

    #[serde(alias = "alphaSort")]
    pub alpha_sort: bool,

    #[serde(alias = "disambiguatePaths")]
    pub disambiguate_paths: bool,

    #[serde(alias = "runOnCompile")]
    pub run_on_compile: bool,

    /// Fail the build instead of warning when a contract is too large
    pub strict: bool,

    /// Contract name patterns to include; everything when empty
    pub only: Vec<String>,
}

impl Default for SizeCheckSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_CONTRACT_BYTES,
            alpha_sort: true,
            disambiguate_paths: false,
            run_on_compile: true,
            strict: true,
            only: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageSettings {
    /// Network the instrumented tests run against
    pub network: Option<String>,

    #[serde(alias = "skipFiles")]
    pub skip_files: Vec<String>,
}

/// Source verification on a block explorer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifySettings {
    /// Secret holding the explorer API key
    #[serde(alias = "apiKey")]
    pub api_key: Option<String>,

    /// Explorer-side network name; the resolved network name when absent
    #[serde(alias = "networkIdentifier")]
    pub network_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageSettings {
    GasReport(GasReportSettings),
    SizeCheck(SizeCheckSettings),
    Coverage(CoverageSettings),
    Verify(VerifySettings),
}

impl StageSettings {
    pub fn stage(&self) -> Stage {
        match self {
            StageSettings::GasReport(_) => Stage::GasReport,
            StageSettings::SizeCheck(_) => Stage::SizeCheck,
            StageSettings::Coverage(_) => Stage::Coverage,
            StageSettings::Verify(_) => Stage::Verify,
        }
    }

    fn parse(stage: Stage, parameters: &StageParameters) -> Result<Self, String> {
        match stage {
            Stage::GasReport => parse_as(parameters).map(StageSettings::GasReport),
            Stage::SizeCheck => parse_as(parameters).map(StageSettings::SizeCheck),
            Stage::Coverage => parse_as(parameters).map(StageSettings::Coverage),
            Stage::Verify => parse_as(parameters).map(StageSettings::Verify),
        }
    }

    /// Stage-specific rules. Returns one message per broken rule.
    fn check(&self, enabled: bool) -> Vec<String> {
        let mut problems = Vec::new();
        match self {
            StageSettings::GasReport(settings) => {
                let currency = &settings.currency;
                if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
                    problems.push(format!("currency '{}' is not a three-letter code", currency));
                }
                if !settings.gas_price.is_finite() || settings.gas_price <= 0.0 {
                    problems.push("gas_price must be positive".to_string());
                }
                if matches!(&settings.coinmarketcap_key, Some(key) if key.trim().is_empty()) {
                    problems.push("coinmarketcap_key cannot be empty".to_string());
                }
            }
            StageSettings::SizeCheck(settings) => {
                if settings.max_bytes == 0 {
                    problems.push("max_bytes must be positive".to_string());
                }
                if settings.only.iter().any(|pattern| pattern.trim().is_empty()) {
                    problems.push("only patterns cannot be empty".to_string());
                }
            }
            StageSettings::Coverage(settings) => {
                if matches!(&settings.network, Some(network) if network.trim().is_empty()) {
                    problems.push("network cannot be empty".to_string());
                }
                if settings.skip_files.iter().any(|file| file.trim().is_empty()) {
                    problems.push("skip_files entries cannot be empty".to_string());
                }
            }
            StageSettings::Verify(settings) => match &settings.api_key {
                Some(key) if key.trim().is_empty() => {
                    problems.push("api_key cannot be empty".to_string());
                }
                None if enabled => {
                    problems.push("api_key is required when verification is enabled".to_string());
                }
                _ => {}
            },
        }
        problems
    }
}

fn parse_as<T: DeserializeOwned>(parameters: &StageParameters) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::Object(parameters.clone()))
        .map_err(|e| format!("invalid parameters: {}", e))
}

/// Typed settings and enabled flag for one stage after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStage {
    pub enabled: bool,
    pub settings: StageSettings,
}

/// Independently toggled pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineToggle {
    stages: BTreeMap<Stage, StageConfig>,
}

impl Default for PipelineToggle {
    fn default() -> Self {
        Self {
            stages: Stage::ALL
                .iter()
                .map(|&stage| (stage, StageConfig::default()))
                .collect(),
        }
    }
}

impl PipelineToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.config(stage).enabled
    }

    pub fn config(&self, stage: Stage) -> &StageConfig {
        // every stage is inserted by Default and never removed
        &self.stages[&stage]
    }

    pub fn parameters(&self, stage: Stage) -> &StageParameters {
        &self.config(stage).parameters
    }

    /// Replace a stage's parameters, keeping its enabled flag.
    pub fn configure(&mut self, stage: &str, parameters: StageParameters) -> ConfigResult<()> {
        let stage = Stage::from_str(stage)?;
        self.entry(stage).parameters = parameters;
        Ok(())
    }

    pub fn set_enabled(&mut self, stage: &str, enabled: bool) -> ConfigResult<()> {
        let stage = Stage::from_str(stage)?;
        self.entry(stage).enabled = enabled;
        Ok(())
    }

    pub fn enable(&mut self, stage: &str) -> ConfigResult<()> {
        self.set_enabled(stage, true)
    }

    pub fn disable(&mut self, stage: &str) -> ConfigResult<()> {
        self.set_enabled(stage, false)
    }

    fn entry(&mut self, stage: Stage) -> &mut StageConfig {
        self.stages.entry(stage).or_default()
    }

    pub fn enabled_stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages
            .iter()
            .filter(|(_, config)| config.enabled)
            .map(|(&stage, _)| stage)
    }

    /// Parse and check every stage, enabled or not, and collect every
    /// problem rather than stopping at the first.
    pub fn validate(&self) -> Result<BTreeMap<Stage, ResolvedStage>, Vec<StageViolation>> {
        let (resolved, violations) = self.check();
        if violations.is_empty() {
            Ok(resolved)
        } else {
            Err(violations)
        }
    }

    /// Like [`validate`](Self::validate), but also returns the stages that
    /// parsed so callers can run further checks on them.
    pub(crate) fn check(&self) -> (BTreeMap<Stage, ResolvedStage>, Vec<StageViolation>) {
        let mut resolved = BTreeMap::new();
        let mut violations = Vec::new();

        for (&stage, config) in &self.stages {
            match StageSettings::parse(stage, &config.parameters) {
                Ok(settings) => {
                    violations.extend(
                        settings
                            .check(config.enabled)
                            .into_iter()
                            .map(|reason| StageViolation::new(stage.as_str(), reason)),
                    );
                    resolved.insert(
                        stage,
                        ResolvedStage {
                            enabled: config.enabled,
                            settings,
                        },
                    );
                }
                Err(reason) => violations.push(StageViolation::new(stage.as_str(), reason)),
            }
        }

        (resolved, violations)
    }
}
