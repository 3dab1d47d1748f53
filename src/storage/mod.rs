pub mod json_backend;

use std::path::Path;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends holding a single ledger.
pub trait StorageBackend {
    /// Loads the stored ledger; a missing store yields an empty ledger.
    fn load(&self) -> Result<Ledger>;
    /// Replaces the stored ledger with `ledger` in full.
    fn save(&self, ledger: &Ledger) -> Result<()>;
    fn path(&self) -> &Path;
}

pub use json_backend::JsonStorage;
