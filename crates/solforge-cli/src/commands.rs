//! CLI subcommand implementations.

use anyhow::{bail, Context, Result};
use solforge_config::{
    ConfigBuilder, ConfigLoader, FileLoader, ProjectDeclaration, SecretSource, Stage,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

fn loader(secrets: Option<PathBuf>) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::from_env().context("reading SOLFORGE_* environment")?;
    if let Some(path) = secrets {
        loader = loader.with_secrets(SecretSource::File(path));
    }
    Ok(loader)
}

pub fn resolve(config: &Path, network: Option<String>, secrets: Option<PathBuf>) -> Result<()> {
    let mut loader = loader(secrets)?;
    if let Some(network) = network {
        loader = loader.with_network(network);
    }

    let resolver = loader
        .load(config)
        .with_context(|| format!("loading {}", config.display()))?;
    let resolved = resolver.resolve_default()?;

    print!("{}", resolved.report());
    Ok(())
}

pub fn check(config: &Path, secrets: Option<PathBuf>) -> Result<()> {
    let resolver = loader(secrets)?
        .load(config)
        .with_context(|| format!("loading {}", config.display()))?;

    let mut failures = 0;
    for name in resolver.registry().names() {
        match resolver.resolve(name) {
            Ok(_) => println!("ok      {}", name),
            Err(e) => {
                error!(network = %name, error = %e, "Resolution failed");
                println!("FAILED  {}: {}", name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} network(s) failed to resolve", failures);
    }
    Ok(())
}

/// Load the declaration without secrets; enough for read-only listings.
fn declared(config: &Path) -> Result<ConfigBuilder> {
    let declaration = FileLoader::load_auto(config)
        .with_context(|| format!("loading {}", config.display()))?;
    Ok(ConfigBuilder::from_declaration(declaration)?)
}

pub fn networks(config: &Path) -> Result<()> {
    let resolver = declared(config)?.build();
    let default = resolver.default_network().map(str::to_string);

    for profile in resolver.registry().profiles() {
        let marker = if default.as_deref() == Some(profile.name.as_str()) { "*" } else { " " };
        let chain = profile
            .chain_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{} {:<20} chain {:<8} {}", marker, profile.name, chain, profile.rpc_url);
    }
    Ok(())
}

pub fn stages(config: &Path) -> Result<()> {
    let resolver = declared(config)?.build();
    let pipeline = resolver.pipeline();

    for stage in Stage::ALL {
        let state = if pipeline.is_enabled(stage) { "enabled" } else { "disabled" };
        println!(
            "{:<10} {:<9} {} parameter(s)",
            stage,
            state,
            pipeline.parameters(stage).len()
        );
    }

    if let Err(violations) = pipeline.validate() {
        for violation in &violations {
            println!("  ! {}", violation);
        }
        bail!("{} stage problem(s)", violations.len());
    }
    Ok(())
}

pub fn init(config: &Path, force: bool) -> Result<()> {
    if config.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config.display());
    }

    FileLoader::save_auto(&ProjectDeclaration::with_presets(), config)?;
    info!(path = %config.display(), "Wrote declaration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_writes_presets_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solforge.toml");

        init(&path, false).unwrap();
        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();

        let resolver = declared(&path).unwrap().build();
        assert_eq!(resolver.default_network(), Some("localhost"));
        assert!(resolver.registry().contains("bsctestnet"));

        networks(&path).unwrap();
        stages(&path).unwrap();
    }

    #[test]
    fn resolve_reports_missing_secrets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solforge.toml");
        init(&path, false).unwrap();

        let secrets = dir.path().join("absent.json");
        assert!(resolve(&path, Some("localhost".to_string()), Some(secrets)).is_err());

        let secrets = dir.path().join("secrets.json");
        std::fs::write(&secrets, "{}").unwrap();
        resolve(&path, Some("localhost".to_string()), Some(secrets.clone())).unwrap();
        assert!(resolve(&path, Some("bsctestnet".to_string()), Some(secrets)).is_err());
    }
}
