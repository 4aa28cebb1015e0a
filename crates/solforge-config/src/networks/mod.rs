//! Network profiles, the registry that holds them, and built-in presets

pub mod bsc;
pub mod local;
pub mod profile;
pub mod registry;

pub use profile::{ForkConfig, NetworkProfile};
pub use registry::NetworkRegistry;

use crate::{ConfigError, ConfigResult};

/// Secret name the preset networks sign with.
pub const DEPLOYER_SECRET: &str = "deployer_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPreset {
    Localhost,
    Coverage,
    BscTestnet,
    BscMainnet,
}

impl NetworkPreset {
    pub const ALL: [NetworkPreset; 4] = [
        NetworkPreset::Localhost,
        NetworkPreset::Coverage,
        NetworkPreset::BscTestnet,
        NetworkPreset::BscMainnet,
    ];

    pub fn profile(self) -> NetworkProfile {
        match self {
            NetworkPreset::Localhost => local::localhost_profile(),
            NetworkPreset::Coverage => local::coverage_profile(),
            NetworkPreset::BscTestnet => bsc::bsc_testnet_profile(),
            NetworkPreset::BscMainnet => bsc::bsc_mainnet_profile(),
        }
    }
}

impl std::str::FromStr for NetworkPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "localhost" | "local" => Ok(NetworkPreset::Localhost),
            "coverage" => Ok(NetworkPreset::Coverage),
            "bsctestnet" | "bsc-testnet" | "bsc_testnet" => Ok(NetworkPreset::BscTestnet),
            "mainnet" | "bsc-mainnet" | "bsc_mainnet" => Ok(NetworkPreset::BscMainnet),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

impl NetworkRegistry {
    /// Registry pre-populated with every [`NetworkPreset`].
    pub fn with_presets() -> ConfigResult<Self> {
        let mut registry = Self::new();
        for preset in NetworkPreset::ALL {
            registry.register(preset.profile())?;
        }
        Ok(registry)
    }
}
