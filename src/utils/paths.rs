use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".finance_tracker";
const DATA_DIR: &str = "data";
const STORE_FILE: &str = "transactions.json";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.finance_tracker`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("FINANCE_TRACKER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Default location of the JSON transaction store.
pub fn default_store_file() -> PathBuf {
    store_file_in(&app_data_dir())
}

pub fn store_file_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_DIR).join(STORE_FILE)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}
