//! Application configuration.
//!
//! Provides two loading methods, like the rest of the app's TOML assets:
//! - `default_config()` - the configuration embedded in the binary
//! - `load_config(path)` - a user-supplied file with the same layout
//!
//! `PlantifyConfig::resolve()` picks the effective configuration at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Embedded at compile time from `config/plantify.toml`.
const DEFAULT_CONFIG: &str = include_str!("../config/plantify.toml");

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PLANTIFY_CONFIG";

/// Keychain service under which the API key is stored.
pub const KEYCHAIN_SERVICE: &str = "plantify-api";
pub const KEYCHAIN_USER: &str = "plantify";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantifyConfig {
    pub services: ServiceConfig,
    pub scan: ScanConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub upload_url: String,
    pub analysis_url: String,
    pub entity_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    pub max_upload_bytes: usize,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// File name of the garden database inside the data directory
    pub garden_db: String,
    /// File name of the preferences file inside the data directory
    pub preferences_file: String,
    /// Keep the garden in the remote entity API instead of the local database
    #[serde(default)]
    pub remote_garden: bool,
}

impl PlantifyConfig {
    /// Pick the effective configuration:
    /// 1. `$PLANTIFY_CONFIG` if set
    /// 2. `<config dir>/plantify/plantify.toml` if it exists
    /// 3. the embedded default
    pub fn resolve() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("Loading config from ${} = {}", CONFIG_ENV_VAR, path);
            return load_config(Path::new(&path));
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            info!("Loading config from {:?}", path);
            return load_config(&path);
        }

        Ok(default_config())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_upload_bytes == 0 {
            bail!("scan.max_upload_bytes must be greater than 0");
        }
        if !(1..=100).contains(&self.scan.jpeg_quality) {
            bail!(
                "scan.jpeg_quality must be between 1 and 100, got {}",
                self.scan.jpeg_quality
            );
        }
        if self.services.timeout_secs == 0 {
            bail!("services.timeout_secs must be greater than 0");
        }
        for (name, value) in [
            ("services.upload_url", &self.services.upload_url),
            ("services.analysis_url", &self.services.analysis_url),
            ("services.entity_url", &self.services.entity_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                bail!("{} is not a valid URL ('{}'): {}", name, value, e);
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.services.timeout_secs)
    }

    /// API key from the OS keychain, falling back to the configured env var.
    pub fn api_key(&self) -> Option<String> {
        lookup_api_key(&self.services.api_key_env)
    }
}

/// Read the API key from the OS keychain, then from `env_var`.
pub fn lookup_api_key(env_var: &str) -> Option<String> {
    match Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER).and_then(|e| e.get_password()) {
        Ok(key) if !key.is_empty() => return Some(key),
        Ok(_) | Err(keyring::Error::NoEntry) => {}
        Err(e) => warn!("Failed to read API key from keychain: {}", e),
    }
    std::env::var(env_var).ok().filter(|k| !k.trim().is_empty())
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<PlantifyConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PlantifyConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Get the default configuration embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_config() -> PlantifyConfig {
    toml::from_str(DEFAULT_CONFIG).expect("embedded plantify.toml must be valid TOML")
}

/// `<config dir>/plantify/plantify.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("plantify").join("plantify.toml"))
}

/// Directory holding the garden database and preferences.
pub fn default_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|d| d.join("plantify"))
        .ok_or_else(|| "Could not determine the user data directory".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_loads_and_validates() {
        let config = default_config();
        assert_eq!(config.scan.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.scan.jpeg_quality, 90);
        assert_eq!(config.services.timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plantify.toml");
        let mut config = default_config();
        config.scan.jpeg_quality = 75;
        config.services.upload_url = "http://localhost:9000/upload".to_string();
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.scan.jpeg_quality, 75);
        assert_eq!(loaded.services.upload_url, "http://localhost:9000/upload");
    }

    #[test]
    fn test_load_config_rejects_bad_quality() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plantify.toml");
        let mut config = default_config();
        config.scan.jpeg_quality = 0;
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = default_config();
        config.services.analysis_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("services.analysis_url"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/plantify.toml")).is_err());
    }
}
