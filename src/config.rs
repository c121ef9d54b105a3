//! Layered settings: built-in defaults, then an optional TOML file, then
//! `EXPENSE_TRACKER_*` environment variables, then command-line overrides.

use crate::classifier::KeywordClassifier;
use crate::store::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/expense_tracker.toml";
pub const ENV_PREFIX: &str = "EXPENSE_TRACKER";
const SQLITE_FILE: &str = "expenses.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per slot in `data_dir`
    File,
    /// `expenses.db` in `data_dir`
    Sqlite,
    /// Nothing survives the process
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub backend: Backend,
    /// Optional JSON keyword rules overriding the built-in lists
    pub rules_file: Option<PathBuf>,
    pub currency: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".expense_tracker"),
            backend: Backend::File,
            rules_file: None,
            currency: "₹".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Values given on the command line; `None` leaves the layered value alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub rules_file: Option<PathBuf>,
    pub currency: Option<String>,
    pub log_level: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<AppConfig> {
    let config_path = overrides
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut settings = load_layers(&config_path)?;
    settings.apply(overrides);
    Ok(settings)
}

fn load_layers(config_path: &Path) -> Result<AppConfig> {
    let path = config_path.to_string_lossy();
    let builder = config::Config::builder()
        .add_source(config::File::with_name(&path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX));

    builder
        .build()
        .and_then(|c| c.try_deserialize())
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))
}

impl AppConfig {
    fn apply(&mut self, overrides: Overrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(rules_file) = overrides.rules_file {
            self.rules_file = Some(rules_file);
        }
        if let Some(currency) = overrides.currency {
            self.currency = currency;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
    }

    /// Open the configured key-value backend
    pub fn open_backend(&self) -> Result<Box<dyn KeyValueStore>> {
        let backend: Box<dyn KeyValueStore> = match self.backend {
            Backend::File => Box::new(FileStore::new(&self.data_dir)),
            Backend::Sqlite => {
                let path = self.data_dir.join(SQLITE_FILE);
                let store = SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open database {:?}", path))?;
                Box::new(store)
            }
            Backend::Memory => Box::new(MemoryStore::new()),
        };
        tracing::debug!(backend = ?self.backend, data_dir = ?self.data_dir, "backend opened");
        Ok(backend)
    }

    pub fn classifier(&self) -> Result<KeywordClassifier> {
        match &self.rules_file {
            Some(path) => KeywordClassifier::from_file(path),
            None => Ok(KeywordClassifier::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_layers(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings.backend, Backend::File);
        assert_eq!(settings.currency, "₹");
        assert_eq!(settings.data_dir, PathBuf::from(".expense_tracker"));
        assert!(settings.rules_file.is_none());
    }

    #[test]
    fn test_file_layer_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        fs::write(&path, "backend = \"sqlite\"\ncurrency = \"$\"\n").unwrap();

        let mut settings = load_layers(&path).unwrap();
        assert_eq!(settings.backend, Backend::Sqlite);
        assert_eq!(settings.currency, "$");
        assert_eq!(settings.log_level, "warn");

        settings.apply(Overrides {
            backend: Some(Backend::Memory),
            log_level: Some("debug".to_string()),
            ..Overrides::default()
        });
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.currency, "$");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_bad_backend_name_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        fs::write(&path, "backend = \"cloud\"\n").unwrap();

        assert!(load_layers(&path).is_err());
    }

    #[test]
    fn test_open_each_backend() {
        let dir = tempfile::tempdir().unwrap();

        for backend in [Backend::File, Backend::Sqlite, Backend::Memory] {
            let settings = AppConfig {
                data_dir: dir.path().join("data"),
                backend,
                ..AppConfig::default()
            };
            let mut store = settings.open_backend().unwrap();
            store.set("probe", "1").unwrap();
            assert_eq!(store.get("probe").unwrap(), Some("1".to_string()));
        }
        assert!(dir.path().join("data").join(SQLITE_FILE).exists());
    }

    #[test]
    fn test_classifier_from_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.json");
        fs::write(&rules, r#"{"threshold": 10}"#).unwrap();

        let settings = AppConfig {
            rules_file: Some(rules),
            ..AppConfig::default()
        };
        assert_eq!(settings.classifier().unwrap().threshold(), 10.0);

        let missing = AppConfig {
            rules_file: Some(dir.path().join("nope.json")),
            ..AppConfig::default()
        };
        assert!(missing.classifier().is_err());
    }
}
