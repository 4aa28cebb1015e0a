use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use url::Url;

const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// Connection parameters for one named blockchain endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkProfile {
    /// Unique registry key
    pub name: String,

    /// JSON-RPC endpoint
    #[serde(alias = "url")]
    pub rpc_url: String,

    /// Expected chain id; not enforced when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Fixed gas price in wei
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,

    /// Gas limit override applied to every transaction
    #[serde(default, alias = "gas", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,

    /// Names of the secrets used as signing accounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<String>,

    /// Upstream network to fork for local simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork: Option<ForkConfig>,
}

/// Fork source for a local simulation network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForkConfig {
    /// Name of an already registered network
    pub network: String,

    /// Block to pin the fork at; latest when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl NetworkProfile {
    pub fn new(name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rpc_url: rpc_url.into(),
            chain_id: None,
            gas_price: None,
            gas_limit: None,
            accounts: Vec::new(),
            fork: None,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_account(mut self, secret_name: impl Into<String>) -> Self {
        self.accounts.push(secret_name.into());
        self
    }

    pub fn with_fork(mut self, network: impl Into<String>, block_number: Option<u64>) -> Self {
        self.fork = Some(ForkConfig {
            network: network.into(),
            block_number,
        });
        self
    }

    /// Check the profile on its own. Fork references are checked by the
    /// registry, which knows what has been registered.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("network name cannot be empty"));
        }

        self.parsed_url()?;

        if self.gas_limit == Some(0) {
            return Err(self.invalid("gas limit must be positive"));
        }

        if self.chain_id == Some(0) {
            return Err(self.invalid("chain id cannot be zero"));
        }

        if self.accounts.iter().any(|account| account.trim().is_empty()) {
            return Err(self.invalid("account secret names cannot be empty"));
        }

        if let Some(fork) = &self.fork {
            if fork.network == self.name {
                return Err(self.invalid("a network cannot fork itself"));
            }
        }

        Ok(())
    }

    /// Parse the RPC endpoint, rejecting empty strings and unsupported
    /// schemes.
    pub fn parsed_url(&self) -> ConfigResult<Url> {
        if self.rpc_url.trim().is_empty() {
            return Err(self.invalid("rpc url cannot be empty"));
        }

        let url = Url::parse(&self.rpc_url)
            .map_err(|e| self.invalid(&format!("rpc url '{}' is malformed: {}", self.rpc_url, e)))?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(self.invalid(&format!(
                "rpc url scheme '{}' is not one of {}",
                url.scheme(),
                SUPPORTED_SCHEMES.join(", ")
            )));
        }

        if url.host_str().is_none() {
            return Err(self.invalid("rpc url has no host"));
        }

        Ok(url)
    }

    pub(crate) fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidNetwork {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}
