//! Terminal output. Warnings and errors go to stderr, everything else to
//! stdout, so scripted runs can keep listings apart from problems.

use std::fmt::Display;

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Warning => "warn",
            Level::Error => "error",
        }
    }

    fn paint(self, text: String) -> ColoredString {
        match self {
            Level::Info => text.normal(),
            Level::Success => text.green(),
            Level::Warning => text.yellow(),
            Level::Error => text.red().bold(),
        }
    }
}

fn render(level: Level, message: impl Display) -> String {
    level
        .paint(format!("[{}] {}", level.tag(), message))
        .to_string()
}

fn emit(level: Level, message: impl Display) {
    let text = render(level, message);
    match level {
        Level::Warning | Level::Error => eprintln!("{text}"),
        Level::Info | Level::Success => println!("{text}"),
    }
}

pub fn info(message: impl Display) {
    emit(Level::Info, message);
}

pub fn success(message: impl Display) {
    emit(Level::Success, message);
}

pub fn warning(message: impl Display) {
    emit(Level::Warning, message);
}

pub fn error(message: impl Display) {
    emit(Level::Error, message);
}

/// Heading above a listing.
pub fn section(title: impl Display) {
    println!("\n{}", title.to_string().bold().underline());
}

pub fn line(message: impl Display) {
    println!("{message}");
}

/// Colors already formatted money by the sign of `signed`.
pub fn money(text: String, signed: f64) -> ColoredString {
    if signed.is_sign_negative() {
        text.red()
    } else {
        text.green()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_a_level_tag() {
        colored::control::set_override(false);
        assert_eq!(render(Level::Error, "store is corrupt"), "[error] store is corrupt");
        assert_eq!(render(Level::Success, "Saved."), "[ok] Saved.");
        assert_eq!(money("R$ -3.00".into(), -3.0).to_string(), "R$ -3.00");
    }
}
