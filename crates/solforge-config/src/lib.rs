//! Solforge Configuration Resolution
//!
//! This crate decides, for one toolchain invocation, which network to target,
//! which credentials and endpoint to use, which compiler settings apply and
//! which optional pipeline stages run. Everything is validated up front and
//! frozen into a [`ResolvedConfig`].

pub mod config;
pub mod error;
pub mod loader;
pub mod networks;
pub mod resolved;
pub mod resolver;
pub mod secrets;

// Re-exports for convenience
pub use config::*;
pub use loader::{ConfigLoader, EnvOverrides, FileLoader};
pub use resolved::{CompilerInput, ConnectionParams, ForkTarget, ResolvedConfig, VerificationTarget};
pub use resolver::{ConfigBuilder, ConfigResolver};
pub use secrets::{Secret, SecretSource, SecretStore};

// Re-export main types
pub use error::{ConfigError, ConfigResult, ErrorKind, StageViolation};

// Re-export network types
pub use networks::{ForkConfig, NetworkPreset, NetworkProfile, NetworkRegistry};
