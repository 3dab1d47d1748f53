use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    ledger::Ledger,
    utils::{
        paths,
        persistence::{ensure_dir, write_atomic},
    },
};

use super::{Result, StorageBackend};

/// Flat JSON file store: `{ "transactions": [...] }`, pretty-printed.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self { path })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(paths::default_store_file())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Ledger> {
        load_ledger_from_path(&self.path)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger_to_path(ledger, &self.path)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no store found, starting with an empty ledger");
            return Ok(Ledger::new());
        }
        Err(err) => return Err(err.into()),
    };
    let ledger: Ledger = serde_json::from_str(&data)?;
    tracing::info!(
        path = %path.display(),
        transactions = ledger.len(),
        "ledger loaded"
    );
    Ok(ledger)
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        transactions = ledger.len(),
        "ledger saved"
    );
    Ok(())
}
