//! Client configuration loading.
//!
//! `config.toml` provides the base values; a handful of environment
//! variables override them so scripts can point the CLI elsewhere without
//! touching the file.

use humloop_core::config::ClientConfig;
use humloop_core::{HumloopError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_API_URL: &str = "HUMLOOP_API_URL";
pub const ENV_GENERATION_URL: &str = "HUMLOOP_GENERATION_URL";
pub const ENV_MAX_UPLOAD_BYTES: &str = "HUMLOOP_MAX_UPLOAD_BYTES";

/// Reads [`ClientConfig`] from a TOML file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file. A missing or empty file yields the defaults.
    pub fn load(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file, then applies environment overrides.
    pub fn load_with_env(&self) -> Result<ClientConfig> {
        let config = self.load()?;
        apply_overrides(config, |key| std::env::var(key).ok())
    }
}

/// Applies overrides looked up through `lookup`.
///
/// Blank values are ignored. An upload ceiling that is not a positive integer
/// is a configuration error rather than a silent fallback.
pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = get(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(url) = get(ENV_GENERATION_URL) {
        config.generation_base_url = url;
    }
    if let Some(raw) = get(ENV_MAX_UPLOAD_BYTES) {
        match raw.parse::<u64>() {
            Ok(bytes) if bytes > 0 => config.max_upload_bytes = bytes,
            _ => {
                warn!(value = %raw, "Rejected upload ceiling override");
                return Err(HumloopError::config(format!(
                    "{ENV_MAX_UPLOAD_BYTES} must be a positive integer, got '{raw}'"
                )));
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("config.toml"));
        assert_eq!(storage.load().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"https://api.example.com/api\"\nmax_upload_bytes = 1024\n",
        )
        .unwrap();

        let config = ConfigStorage::new(path).load().unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/api");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "api_base_url = ").unwrap();

        let err = ConfigStorage::new(path).load().unwrap_err();
        assert!(matches!(err, HumloopError::Serialization { .. }));
    }

    #[test]
    fn test_env_overrides_win() {
        let config = apply_overrides(
            ClientConfig::default(),
            env(&[
                (ENV_API_URL, "http://api.test"),
                (ENV_GENERATION_URL, " "),
                (ENV_MAX_UPLOAD_BYTES, "2048"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://api.test");
        assert_eq!(config.generation_base_url, ClientConfig::default().generation_base_url);
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn test_bad_upload_override_is_rejected() {
        let err = apply_overrides(ClientConfig::default(), env(&[(ENV_MAX_UPLOAD_BYTES, "lots")])).unwrap_err();
        assert!(matches!(err, HumloopError::Config(_)));
    }
}
