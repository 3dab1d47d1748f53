//! Read-dispatch loop. Commands come from a rustyline editor on a terminal,
//! or one per stdin line when `FINANCE_TRACKER_CLI_SCRIPT` is set.

use std::io::{self, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context as ReadlineContext, Editor, Helper,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;

pub const SCRIPT_ENV: &str = "FINANCE_TRACKER_CLI_SCRIPT";

/// Runs the shell until `exit`, end of input, or a confirmed Ctrl-C, then
/// writes the ledger back to its store.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let mut input = Input::open(&context)?;
    let outcome = read_eval(&mut context, &mut input);
    let saved = context.shutdown();
    outcome.and(saved)
}

enum Input {
    Editor(Box<Editor<CommandHelper, DefaultHistory>>),
    Script(io::Lines<StdinLock<'static>>),
}

enum Event {
    Line(String),
    Interrupted,
    Closed,
}

impl Input {
    fn open(context: &ShellContext) -> Result<Self, CliError> {
        if context.mode == CliMode::Script {
            return Ok(Input::Script(io::stdin().lines()));
        }
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper {
            names: context.command_names(),
        }));
        output::info(format!(
            "{} transaction(s) in {}, balance {}. Type `help` for commands.",
            context.ledger.len(),
            context.storage_path().display(),
            context.format_amount(context.ledger.balance())
        ));
        Ok(Input::Editor(Box::new(editor)))
    }

    fn read(&mut self, prompt: &str) -> Result<Event, CliError> {
        match self {
            Input::Script(lines) => match lines.next() {
                Some(line) => Ok(Event::Line(line?)),
                None => Ok(Event::Closed),
            },
            Input::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.trim()).ok();
                    }
                    Ok(Event::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Event::Interrupted),
                Err(ReadlineError::Eof) => Ok(Event::Closed),
                Err(err) => Err(err.into()),
            },
        }
    }
}

fn read_eval(context: &mut ShellContext, input: &mut Input) -> Result<(), CliError> {
    while context.running {
        match input.read(&context.prompt())? {
            Event::Line(line) => match handle_line(context, &line) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => break,
                Err(err) => context.report_error(err)?,
            },
            Event::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Event::Closed => break,
        }
    }
    if context.dirty && context.mode == CliMode::Interactive {
        output::info("Saving pending changes.");
    }
    Ok(())
}

/// Tokenizes one line with shell quoting and runs it.
pub(crate) fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {}.", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());
    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tab completion of command names in the first word.
struct CommandHelper {
    names: Vec<&'static str>,
}

impl CommandHelper {
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let before = &line[..pos];
        let start = before.len() - before.trim_start().len();
        let word = &before[start..];
        if word.contains(char::is_whitespace) {
            return (pos, Vec::new());
        }
        let word = word.to_ascii_lowercase();
        let pairs = self
            .names
            .iter()
            .filter(|name| name.starts_with(&word))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        (start, pairs)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use tempfile::tempdir;

    #[test]
    fn quoted_descriptions_stay_one_argument() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut ctx = ShellContext::with_config_manager(CliMode::Script, manager).unwrap();

        handle_line(&mut ctx, r#"add expense 12 "Corner shop" Groceries"#).unwrap();
        let txn = &ctx.ledger.transactions()[0];
        assert_eq!(txn.description, "Corner shop");
        assert_eq!(txn.category, "Groceries");

        let control = handle_line(&mut ctx, "add expense 3 \"unterminated").unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(ctx.ledger.len(), 1);
        assert_eq!(handle_line(&mut ctx, "   ").unwrap(), LoopControl::Continue);
    }

    #[test]
    fn completion_only_offers_command_names_for_the_first_word() {
        let helper = CommandHelper {
            names: vec!["export-csv", "export-pdf", "exit", "add"],
        };
        let (start, pairs) = helper.candidates("  exp", 5);
        assert_eq!(start, 2);
        let names: Vec<_> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, vec!["export-csv", "export-pdf"]);
        let (_, pairs) = helper.candidates("export-csv ex", 13);
        assert!(pairs.is_empty());
    }
}
