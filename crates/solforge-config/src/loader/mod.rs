//! Declaration loading and environment handling

pub mod env;
pub mod file;

pub use env::EnvOverrides;
pub use file::FileLoader;

use crate::resolver::{ConfigBuilder, ConfigResolver};
use crate::secrets::{SecretSource, SecretStore};
use crate::ConfigResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Secrets file looked up next to the declaration when nothing else is set
pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

/// Loads a declaration, its secrets and any overrides into a
/// [`ConfigResolver`].
///
/// Precedence: explicit arguments > environment > declaration > defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    env: EnvOverrides,
    secrets: Option<SecretSource>,
    network: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader honouring the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self::new().with_env(EnvOverrides::from_env()?))
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    /// Use this secret source regardless of environment or declaration
    pub fn with_secrets(mut self, source: SecretSource) -> Self {
        self.secrets = Some(source);
        self
    }

    /// Use this network as the default regardless of environment or
    /// declaration
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ConfigResolver> {
        let path = path.as_ref();
        let mut declaration = FileLoader::load_auto(path)?;
        debug!(path = %path.display(), networks = declaration.networks.len(), "Loaded declaration");

        let source = self.secret_source(path, declaration.secrets_file.take());
        let secrets = SecretStore::load(source)?;

        let mut builder = ConfigBuilder::from_declaration(declaration)?;
        builder = self.env.apply(builder)?;
        if let Some(network) = &self.network {
            builder = builder.default_network(network.clone());
        }

        Ok(builder.secrets(secrets).build())
    }

    fn secret_source(&self, declaration_path: &Path, declared: Option<PathBuf>) -> SecretSource {
        if let Some(source) = &self.secrets {
            return source.clone();
        }
        if let Some(path) = &self.env.secrets_file {
            return SecretSource::File(path.clone());
        }

        let base = declaration_path.parent().unwrap_or_else(|| Path::new("."));
        let file = declared.unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE));
        SecretSource::File(base.join(file))
    }
}
