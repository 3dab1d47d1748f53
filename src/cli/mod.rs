//! Line-oriented shell over a single ledger store.

pub mod commands;
pub mod core;
pub mod output;
pub mod registry;
pub mod shell;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use self::shell::run_cli;
