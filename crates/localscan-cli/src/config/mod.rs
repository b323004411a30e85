//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use localscan::{ConfigStore, LocalScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::output::OutputFormat;

/// Keys accepted by `localscan config set`
pub const KEYS: &[(&str, &str)] = &[
    ("asca_port", "Port of the running ASCA engine"),
    ("vorpal_port", "Port of the running Vorpal engine"),
    ("asca_location", "Directory holding a user-managed ASCA executable"),
    ("base_dir", "Directory engines are installed under (default: temp dir)"),
    ("output_format", "Default output format (pretty/json)"),
    ("licensed_features", "Comma-separated licensed engine features"),
];

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Port of the running ASCA engine.
    pub asca_port: Option<u16>,

    /// Port of the running Vorpal engine.
    pub vorpal_port: Option<u16>,

    /// Directory holding a user-managed ASCA executable.
    pub asca_location: Option<String>,

    /// Directory engines are installed under.
    pub base_dir: Option<PathBuf>,

    /// Engine features the user is licensed for.
    #[serde(default)]
    pub licensed_features: Vec<String>,
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "localscan", "localscan")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Value of a key as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output_format" => self.output_format.map(|f| f.to_string()),
            "asca_port" => self.asca_port.map(|p| p.to_string()),
            "vorpal_port" => self.vorpal_port.map(|p| p.to_string()),
            "asca_location" => self.asca_location.clone(),
            "base_dir" => self.base_dir.as_ref().map(|d| d.display().to_string()),
            "licensed_features" if !self.licensed_features.is_empty() => {
                Some(self.licensed_features.join(","))
            }
            _ => None,
        }
    }

    /// Set a key from its string form. An empty value clears the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let present = !value.is_empty();

        match key {
            "output_format" => {
                self.output_format = present.then(|| value.parse()).transpose()?;
            }
            "asca_port" => self.asca_port = parse_port(key, value)?,
            "vorpal_port" => self.vorpal_port = parse_port(key, value)?,
            "asca_location" => self.asca_location = present.then(|| value.to_string()),
            "base_dir" => self.base_dir = present.then(|| PathBuf::from(value)),
            "licensed_features" => {
                self.licensed_features = value
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {
                let available: Vec<String> = KEYS
                    .iter()
                    .map(|(name, help)| format!("  {name:<18} - {help}"))
                    .collect();
                anyhow::bail!(
                    "Unknown config key: {key}\n\nAvailable keys:\n{}",
                    available.join("\n")
                );
            }
        }

        Ok(())
    }
}

fn parse_port(key: &str, value: &str) -> Result<Option<u16>> {
    if value.is_empty() {
        return Ok(None);
    }
    let port = value
        .parse::<u16>()
        .with_context(|| format!("{key} must be a port number, got {value}"))?;
    Ok(Some(port))
}

/// [`ConfigStore`] backed by the TOML config file; every `set` is saved.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
}

impl FileConfigStore {
    /// Open the config file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load(&path)?;
        Ok(Self {
            path,
            config: Mutex::new(config),
        })
    }

    /// Config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current configuration
    pub fn snapshot(&self) -> Config {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
    }

    fn set(&self, key: &str, value: &str) -> localscan::Result<()> {
        let mut config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        config
            .set(key, value)
            .and_then(|()| config.save(&self.path))
            .map_err(|e| LocalScanError::Config(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_and_get_keys() {
        let mut config = Config::default();
        config.set("asca_port", "40123").unwrap();
        config.set("asca_location", " /opt/asca ").unwrap();
        config.set("licensed_features", "AI Protection, SAST").unwrap();

        assert_eq!(config.get("asca_port").as_deref(), Some("40123"));
        assert_eq!(config.get("asca_location").as_deref(), Some("/opt/asca"));
        assert_eq!(config.licensed_features, vec!["AI Protection", "SAST"]);

        config.set("asca_port", "").unwrap();
        assert!(config.get("asca_port").is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("asca_port", "70000").is_err());
        assert!(config.set("output_format", "yaml").is_err());
        let err = config.set("api_key", "x").unwrap_err();
        assert!(err.to_string().contains("vorpal_port"));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let store = FileConfigStore::open(&path).unwrap();
        store.set("vorpal_port", "9001").unwrap();

        let reopened = FileConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get("vorpal_port").as_deref(), Some("9001"));
        assert_eq!(reopened.snapshot().vorpal_port, Some(9001));
    }

    #[test]
    fn test_file_store_reports_invalid_port() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join("config.toml")).unwrap();
        let err = store.set("asca_port", "not-a-port").unwrap_err();
        assert!(matches!(err, LocalScanError::Config(_)));
    }
}
