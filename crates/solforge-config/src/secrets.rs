//! Credential storage.
//!
//! Secrets are read once from a local source that is never committed to
//! version control. Declarations only ever carry secret *names*; the values
//! live here and nowhere else.

use crate::loader::env::process_vars;
use crate::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Default prefix for secrets supplied through the environment.
pub const DEFAULT_SECRET_ENV_PREFIX: &str = "SOLFORGE_SECRET_";

/// Length in bytes of a secp256k1 private key.
pub const PRIVATE_KEY_LEN: usize = 32;

/// An opaque credential value.
///
/// The value is only reachable through [`Secret::expose`] and is wiped from
/// memory when dropped. `Debug` and `Display` never print it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    name: String,
    value: String,
}

impl Secret {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name the secret is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the raw credential.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Decode the value as a hex-encoded 32-byte private key, with or
    /// without a `0x` prefix.
    pub fn to_private_key(&self) -> ConfigResult<Zeroizing<[u8; PRIVATE_KEY_LEN]>> {
        let digits = self
            .value
            .strip_prefix("0x")
            .or_else(|| self.value.strip_prefix("0X"))
            .unwrap_or(self.value.as_str());

        let mut key = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        hex::decode_to_slice(digits, &mut key[..]).map_err(|e| ConfigError::MalformedSecret {
            name: self.name.clone(),
            network: None,
            reason: format!("not a {}-byte hex private key ({})", PRIVATE_KEY_LEN, e),
        })?;

        Ok(key)
    }

    fn check_shape(&self) -> ConfigResult<()> {
        if self.value.is_empty() {
            return Err(ConfigError::MalformedSecret {
                name: self.name.clone(),
                network: None,
                reason: "value is empty".to_string(),
            });
        }
        if self.value.trim() != self.value {
            return Err(ConfigError::MalformedSecret {
                name: self.name.clone(),
                network: None,
                reason: "value has leading or trailing whitespace".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<secret {}>", self.name)
    }
}

/// Where the secret store reads its values from.
#[derive(Clone)]
pub enum SecretSource {
    /// A local JSON or TOML document mapping names to string values.
    File(PathBuf),
    /// Process environment variables named `<prefix><NAME>`.
    Environment { prefix: String },
    /// Values supplied directly by the embedding program.
    Inline(Vec<(String, String)>),
}

impl SecretSource {
    pub fn environment() -> Self {
        SecretSource::Environment {
            prefix: DEFAULT_SECRET_ENV_PREFIX.to_string(),
        }
    }

    fn describe(&self) -> String {
        match self {
            SecretSource::File(path) => format!("file {}", path.display()),
            SecretSource::Environment { prefix } => format!("environment ({}*)", prefix),
            SecretSource::Inline(_) => "inline".to_string(),
        }
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Read-only store of named credentials.
#[derive(Clone, Default)]
pub struct SecretStore {
    secrets: HashMap<String, Secret>,
}

impl SecretStore {
    /// Load every secret from `source`.
    ///
    /// A missing file is a [`ConfigError::MissingSecret`]; unreadable or
    /// badly shaped content is a [`ConfigError::MalformedSecret`]. There is
    /// no fallback to an empty store.
    pub fn load(source: SecretSource) -> ConfigResult<Self> {
        let origin = source.describe();
        let store = match source {
            SecretSource::File(path) => Self::load_file(&path)?,
            SecretSource::Environment { prefix } => {
                let vars = process_vars(|key| key.starts_with(prefix.as_str()))?;
                Self::from_vars(&prefix, vars)?
            }
            SecretSource::Inline(entries) => Self::from_entries(entries)?,
        };

        debug!(source = %origin, count = store.len(), "Loaded secret store");
        Ok(store)
    }

    /// Build a store from `(name, value)` pairs. A name given twice is
    /// rejected.
    pub fn from_entries<I, K, V>(entries: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut secrets = HashMap::new();
        for (name, value) in entries {
            let secret = Secret::new(name, value);
            secret.check_shape()?;
            if secrets.contains_key(&secret.name) {
                return Err(ConfigError::MalformedSecret {
                    name: secret.name.clone(),
                    network: None,
                    reason: "defined more than once".to_string(),
                });
            }
            secrets.insert(secret.name.clone(), secret);
        }
        Ok(Self { secrets })
    }

    /// Collect every variable starting with `prefix`; the remainder of the
    /// variable name, lower-cased, becomes the secret name. Two variables
    /// that lower-case to the same name are rejected.
    pub fn from_vars<I>(prefix: &str, vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = vars.into_iter().filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_lowercase(), value))
        });
        Self::from_entries(entries)
    }

    fn load_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::MissingSecret {
                name: path.display().to_string(),
                network: None,
            });
        }

        let content = Zeroizing::new(std::fs::read_to_string(path)?);
        let malformed = |reason: String| ConfigError::MalformedSecret {
            name: path.display().to_string(),
            network: None,
            reason,
        };

        let entries: Vec<(String, serde_json::Value)> =
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => parse_toml(&content).map_err(malformed)?,
                Some("json") | None => parse_json(&content).map_err(malformed)?,
                Some(ext) => {
                    return Err(ConfigError::InvalidFormat(format!(
                        "Unsupported secrets file extension: {}",
                        ext
                    )))
                }
            };

        let mut pairs = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            match value {
                serde_json::Value::String(value) => pairs.push((name, value)),
                _ => {
                    return Err(ConfigError::MalformedSecret {
                        name,
                        network: None,
                        reason: "value must be a string".to_string(),
                    })
                }
            }
        }
        Self::from_entries(pairs)
    }

    /// Look up a secret by name.
    pub fn get(&self, name: &str) -> ConfigResult<&Secret> {
        self.secrets
            .get(name)
            .ok_or_else(|| ConfigError::MissingSecret {
                name: name.to_string(),
                network: None,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.secrets.keys().collect();
        names.sort();
        f.debug_struct("SecretStore").field("names", &names).finish()
    }
}

fn parse_json(content: &str) -> Result<Vec<(String, serde_json::Value)>, String> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(content).map_err(|e| e.to_string())?;
    Ok(map.into_iter().collect())
}

fn parse_toml(content: &str) -> Result<Vec<(String, serde_json::Value)>, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    Ok(table
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                toml::Value::String(s) => serde_json::Value::String(s),
                _ => serde_json::Value::Null,
            };
            (name, value)
        })
        .collect())
}
