use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    codecs::{DateFallback, ImportOptions},
    errors::LedgerError,
    utils::{
        paths,
        persistence::{ensure_dir, write_atomic},
    },
};

const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides `<app dir>/data/transactions.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    pub currency_symbol: String,
    pub import_date_fallback: DateFallback,
    /// Save the store after every mutating command.
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_file: None,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.into(),
            import_date_fallback: DateFallback::default(),
            autosave: false,
        }
    }
}

impl Config {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            date_fallback: self.import_date_fallback,
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Store file for `config`, relative paths resolved against the app dir.
    pub fn store_file(&self, config: &Config) -> PathBuf {
        match &config.store_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => paths::store_file_in(&self.base),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.currency_symbol, "R$");
        assert_eq!(
            manager.store_file(&config),
            dir.path().join("data").join("transactions.json")
        );
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            store_file: Some(PathBuf::from("books/2024.json")),
            currency_symbol: "$".into(),
            import_date_fallback: DateFallback::Skip,
            autosave: true,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(manager.store_file(&config), dir.path().join("books/2024.json"));
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "import_date_fallback": "skip" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.import_options().date_fallback, DateFallback::Skip);
        assert_eq!(config.currency_symbol, "R$");
        assert!(!config.autosave);
    }

    #[test]
    fn malformed_config_is_a_format_error() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{ nope").unwrap();
        assert!(matches!(manager.load(), Err(LedgerError::Format(_))));
    }
}
