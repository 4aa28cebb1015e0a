use super::NetworkProfile;
use crate::{ConfigError, ConfigResult};
use std::collections::HashMap;
use tracing::debug;

/// Name-keyed set of network profiles.
///
/// Registration order is preserved and a fork source must already be
/// registered, so fork references always point backwards and cannot form a
/// cycle.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    profiles: Vec<NetworkProfile>,
    index: HashMap<String, usize>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile. On error the registry is left untouched.
    pub fn register(&mut self, profile: NetworkProfile) -> ConfigResult<()> {
        if self.index.contains_key(&profile.name) {
            return Err(ConfigError::DuplicateNetwork(profile.name));
        }

        profile.validate()?;

        if let Some(fork) = &profile.fork {
            if !self.index.contains_key(&fork.network) {
                return Err(profile.invalid(&format!(
                    "fork source '{}' must be registered first",
                    fork.network
                )));
            }
        }

        debug!(network = %profile.name, rpc_url = %profile.rpc_url, "Registered network");

        self.index.insert(profile.name.clone(), self.profiles.len());
        self.profiles.push(profile);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> ConfigResult<&NetworkProfile> {
        self.index
            .get(name)
            .map(|&position| &self.profiles[position])
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// The profile `name` forks from, if any.
    pub fn fork_source(&self, name: &str) -> ConfigResult<Option<&NetworkProfile>> {
        let profile = self.resolve(name)?;
        match &profile.fork {
            Some(fork) => self.resolve(&fork.network).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    pub fn profiles(&self) -> &[NetworkProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
