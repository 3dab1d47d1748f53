//! Shell context, dispatch, and error reporting.

use std::{io, path::Path};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    codecs::ImportOptions,
    config::{Config, ConfigManager},
    errors::LedgerError,
    ledger::Ledger,
    storage::{JsonStorage, StorageBackend},
};

use super::commands;
use super::output;
use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Everything a command can touch. The shell is the only owner of the ledger.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub ledger: Ledger,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    /// Mutations since the last save.
    pub dirty: bool,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config = config_manager.load()?;
        let storage = JsonStorage::new(config_manager.store_file(&config))?;
        let ledger = storage.load()?;

        Ok(ShellContext {
            mode,
            registry,
            ledger,
            storage,
            config_manager,
            config,
            dirty: false,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.iter().map(|entry| entry.name).collect()
    }

    pub(crate) fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    pub(crate) fn prompt(&self) -> String {
        if self.dirty {
            "finance*> ".into()
        } else {
            "finance> ".into()
        }
    }

    pub(crate) fn import_options(&self) -> ImportOptions {
        self.config.import_options()
    }

    pub(crate) fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.config.currency_symbol, amount)
    }

    /// Writes the ledger to the store and clears the dirty flag.
    pub(crate) fn save_ledger(&mut self) -> CommandResult {
        self.storage.save(&self.ledger)?;
        self.dirty = false;
        Ok(())
    }

    /// Call after every ledger mutation.
    pub(crate) fn mark_dirty(&mut self) -> CommandResult {
        self.dirty = true;
        if self.config.autosave {
            self.save_ledger()?;
        }
        Ok(())
    }

    /// Final checkpoint when the shell stops, whatever the reason.
    pub(crate) fn shutdown(&mut self) -> Result<(), CliError> {
        self.storage.save(&self.ledger)?;
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.find(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        super::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let closest = self
            .registry
            .iter()
            .map(|entry| (levenshtein(entry.name, input), entry.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = closest {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?;
        Ok(confirmed)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                tracing::warn!(command = ?self.last_command, error = %other, "command failed");
                output::error(other);
                Ok(())
            }
        }
    }
}
