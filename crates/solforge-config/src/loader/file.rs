use crate::config::ProjectDeclaration;
use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::Path;

/// Reads and writes project declarations; the format follows the extension.
pub struct FileLoader;

impl FileLoader {
    /// Load a declaration. `.toml` and `.json` are parsed as such; a file
    /// without an extension is tried as TOML, then as JSON.
    pub fn load_auto<P: AsRef<Path>>(path: P) -> ConfigResult<ProjectDeclaration> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::InvalidFormat(format!(
                "Unsupported declaration extension: {}",
                ext
            ))),
            None => toml::from_str(&content).or_else(|_| Ok(serde_json::from_str(&content)?)),
        }
    }

    pub fn save_toml<P: AsRef<Path>>(declaration: &ProjectDeclaration, path: P) -> ConfigResult<()> {
        let content = toml::to_string_pretty(declaration)
            .map_err(|e| ConfigError::InvalidFormat(format!("TOML serialization failed: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(declaration: &ProjectDeclaration, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(declaration)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Save using the format implied by the extension, TOML by default
    pub fn save_auto<P: AsRef<Path>>(declaration: &ProjectDeclaration, path: P) -> ConfigResult<()> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::save_json(declaration, path),
            _ => Self::save_toml(declaration, path),
        }
    }
}
