use serde_json::json;
use solforge_config::*;

const KEY1: &str = "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

fn params(value: serde_json::Value) -> StageParameters {
    value.as_object().cloned().unwrap_or_default()
}

fn testnet_profile() -> NetworkProfile {
    NetworkProfile::new("testnet", "https://example-testnet")
        .with_chain_id(97)
        .with_gas_price(20_000_000_000)
        .with_account("key1")
}

fn builder() -> ConfigBuilder {
    ConfigResolver::builder()
        .network(NetworkProfile::new("local", "http://127.0.0.1:8545"))
        .unwrap()
        .network(testnet_profile())
        .unwrap()
        .compiler(CompilerSettings::new("0.8.10", true, 200))
        .secrets(SecretStore::from_entries([("key1", KEY1)]).unwrap())
}

/// Test the end-to-end testnet scenario
#[test]
fn test_end_to_end_testnet_resolution() {
    let resolver = builder().default_network("testnet").build();
    assert_eq!(resolver.default_network(), Some("testnet"));

    let config = resolver.resolve("testnet").unwrap();
    let connection = config.connection();
    assert_eq!(connection.rpc_url, "https://example-testnet");
    assert_eq!(connection.chain_id, Some(97));
    assert_eq!(connection.gas_price, Some(20_000_000_000));
    assert_eq!(connection.gas_limit, None);
    assert_eq!(connection.credentials.len(), 1);
    assert_eq!(connection.credentials[0].expose(), KEY1);

    let compiler = config.compiler_input();
    assert_eq!(compiler.version, "0.8.10");
    assert!(compiler.optimizer_enabled);
    assert_eq!(compiler.optimizer_runs, 200);
    assert_eq!(compiler.source_root, ProjectPaths::default().sources);

    let unknown = resolver.resolve("unknown");
    assert!(matches!(unknown, Err(ConfigError::UnknownNetwork(ref name)) if name == "unknown"));
}

/// Test that resolving a network returns the profile with the same name
#[test]
fn test_resolve_round_trip_identity() {
    let resolver = builder().build();
    for name in resolver.registry().names() {
        assert_eq!(resolver.registry().resolve(name).unwrap().name, name);
        assert_eq!(resolver.resolve(name).unwrap().network_name(), name);
    }
}

/// Test that a missing secret aborts resolution
#[test]
fn test_missing_secret_produces_no_config() {
    let resolver = builder().secrets(SecretStore::default()).build();

    match resolver.resolve("testnet") {
        Err(err @ ConfigError::MissingSecret { .. }) => {
            assert_eq!(err.kind(), ErrorKind::MissingSecret);
            assert!(err.to_string().contains("key1"));
            assert!(err.to_string().contains("testnet"));
        }
        other => panic!("expected MissingSecret, got {:?}", other),
    }

    // The local network does not need credentials
    assert!(resolver.resolve("local").unwrap().credentials().is_empty());
}

/// Test duplicate registration through the builder
#[test]
fn test_duplicate_network_rejected() {
    let result = builder().network(NetworkProfile::new("local", "http://127.0.0.1:9999"));
    assert!(matches!(result, Err(ConfigError::DuplicateNetwork(ref name)) if name == "local"));
}

/// Test that disabled optimizer keeps its runs in the resolved output
#[test]
fn test_disabled_optimizer_runs_preserved() {
    let resolver = builder()
        .compiler(CompilerSettings::new("0.8.10", false, 200))
        .build();

    let config = resolver.resolve("local").unwrap();
    assert!(!config.compiler().optimizer.enabled);
    assert_eq!(config.compiler().optimizer.runs, 200);
    assert_eq!(config.compiler().effective_runs(), None);
    assert_eq!(config.compiler_input().optimizer_runs, 200);
}

/// Test that compiler errors propagate unchanged
#[test]
fn test_unsupported_compiler_version() {
    let resolver = builder()
        .compiler(CompilerSettings::new("0.6.99", true, 200))
        .build();

    let err = resolver.resolve("local").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOptimizerConfig);
}

/// Test that stage problems are reported together
#[test]
fn test_stage_errors_aggregated() {
    let resolver = builder()
        .stage("sizeCheck", true, params(json!({ "max_bytes": 0 })))
        .unwrap()
        .stage("gasReport", true, params(json!({ "gas_price": -5 })))
        .unwrap()
        .stage("verify", true, StageParameters::new())
        .unwrap()
        .build();

    match resolver.resolve("testnet") {
        Err(ConfigError::Stages(violations)) => {
            let stages: Vec<&str> = violations.iter().map(|v| v.stage.as_str()).collect();
            assert!(stages.contains(&"sizeCheck"));
            assert!(stages.contains(&"gasReport"));
            assert!(stages.contains(&"verify"));
        }
        other => panic!("expected stage errors, got {:?}", other),
    }
}

/// Test that toggling a stage off and on preserves its parameters
#[test]
fn test_stage_toggle_round_trip() {
    let gas = params(json!({ "currency": "EUR", "gas_price": 35 }));
    let resolver = builder()
        .stage("gasReport", true, gas.clone())
        .unwrap()
        .toggle_stage("gasReport", false)
        .unwrap()
        .toggle_stage("gas-report", true)
        .unwrap()
        .build();

    assert_eq!(resolver.pipeline().parameters(Stage::GasReport), &gas);

    let config = resolver.resolve("local").unwrap();
    let stage = config.stage(Stage::GasReport);
    assert!(stage.enabled);
    match &stage.settings {
        StageSettings::GasReport(settings) => {
            assert_eq!(settings.currency, "EUR");
            assert_eq!(settings.gas_price, 35.0);
        }
        other => panic!("unexpected settings {:?}", other),
    }
}

/// Test verification output only exists when the stage is enabled
#[test]
fn test_verification_target() {
    let secrets = SecretStore::from_entries([("key1", KEY1), ("explorer", "EXPLORERKEY")]).unwrap();
    let verify = params(json!({ "api_key": "explorer", "network_identifier": "bscTestnet" }));

    let disabled = builder()
        .secrets(secrets.clone())
        .stage("verify", false, verify.clone())
        .unwrap()
        .build();
    assert!(disabled.resolve("testnet").unwrap().verification().is_none());

    let enabled = builder()
        .secrets(secrets)
        .stage("verify", true, verify)
        .unwrap()
        .build();
    let config = enabled.resolve("testnet").unwrap();
    let target = config.verification().unwrap();
    assert_eq!(target.api_key.expose(), "EXPLORERKEY");
    assert_eq!(target.network_identifier, "bscTestnet");
}

/// Test that the resolved config can be shared across threads
#[test]
fn test_resolved_config_shared_across_threads() {
    let config = builder().build().resolve("testnet").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = config.clone();
            std::thread::spawn(move || config.connection().chain_id)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(97));
    }
}

/// Test the report never contains secret values
#[test]
fn test_report_redacts_secrets() {
    let config = builder().build().resolve("testnet").unwrap();
    let report = config.report();

    assert!(report.contains("Network: testnet"));
    assert!(report.contains("Chain ID: 97"));
    assert!(report.contains("Version: 0.8.10"));
    assert!(!report.contains(&KEY1[2..]));
    assert!(!format!("{:?}", config).contains(&KEY1[2..]));
}

/// Test the built-in presets resolve with a deployer key
#[test]
fn test_presets_resolve() {
    let resolver = ConfigResolver::builder()
        .registry(NetworkRegistry::with_presets().unwrap())
        .secrets(SecretStore::from_entries([(networks::DEPLOYER_SECRET, KEY1)]).unwrap())
        .build();

    let config = resolver.resolve("bsctestnet").unwrap();
    assert_eq!(config.network().chain_id, Some(97));
    assert_eq!(config.credentials().len(), 1);

    assert!(resolver.resolve("localhost").is_ok());
    assert!(resolver.resolve("coverage").is_ok());
}
