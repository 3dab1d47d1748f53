use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::codecs::{self, parse_amount, parse_date, ImportReport};
use crate::ledger::{Totals, Transaction, TransactionKind};
use crate::storage::StorageBackend;

use super::core::{CommandError, CommandResult, ShellContext};
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "add",
        "Record an income or an expense",
        "add <income|expense> <amount> [description] [category] [YYYY-MM-DD]",
        cmd_add,
    ));
    registry.register(
        CommandEntry::new("list", "List every transaction", "list", cmd_list).with_aliases(&["ls"]),
    );
    registry.register(CommandEntry::new(
        "balance",
        "Show balance, income, and expenses",
        "balance",
        cmd_balance,
    ));
    registry.register(CommandEntry::new(
        "categories",
        "List the categories in use",
        "categories",
        cmd_categories,
    ));
    registry.register(CommandEntry::new(
        "category",
        "List transactions of one category",
        "category <name>",
        cmd_category,
    ));
    registry.register(CommandEntry::new(
        "range",
        "List transactions between two days, both inclusive, as dated by `list`",
        "range <YYYY-MM-DD> <YYYY-MM-DD>",
        cmd_range,
    ));
    registry.register(CommandEntry::new(
        "import-csv",
        "Append transactions from a CSV file",
        "import-csv <path>",
        cmd_import_csv,
    ));
    registry.register(CommandEntry::new(
        "import-xlsx",
        "Append transactions from the first sheet of an XLSX file",
        "import-xlsx <path>",
        cmd_import_xlsx,
    ));
    registry.register(CommandEntry::new(
        "export-csv",
        "Write all transactions to a CSV file",
        "export-csv <path>",
        cmd_export_csv,
    ));
    registry.register(CommandEntry::new(
        "export-xlsx",
        "Write all transactions to an XLSX file",
        "export-xlsx <path>",
        cmd_export_xlsx,
    ));
    registry.register(CommandEntry::new(
        "export-pdf",
        "Write a PDF report of all transactions",
        "export-pdf <path>",
        cmd_export_pdf,
    ));
    registry.register(CommandEntry::new(
        "export-pdf-month",
        "Write a PDF report for one calendar month",
        "export-pdf-month <path> <year> <month>",
        cmd_export_pdf_month,
    ));
    registry.register(CommandEntry::new(
        "save",
        "Save the ledger to the store file",
        "save",
        cmd_save,
    ));
    registry.register(CommandEntry::new(
        "help",
        "Show available commands",
        "help [command]",
        cmd_help,
    ));
    registry.register(
        CommandEntry::new("exit", "Save and leave the shell", "exit", cmd_exit)
            .with_aliases(&["quit"]),
    );
}

fn usage_error(context: &ShellContext, command: &str) -> CommandError {
    let usage = context
        .registry
        .find(command)
        .map(|entry| entry.usage)
        .unwrap_or(command);
    CommandError::InvalidArguments(format!("Usage: {}", usage))
}

fn single_arg<'a>(
    context: &ShellContext,
    command: &str,
    args: &[&'a str],
) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(*value),
        _ => Err(usage_error(context, command)),
    }
}

fn no_args(context: &ShellContext, command: &str, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage_error(context, command))
    }
}

fn invalid_date(raw: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Invalid date `{}`; expected YYYY-MM-DD.", raw))
}

fn date_arg(raw: &str) -> Result<DateTime<FixedOffset>, CommandError> {
    parse_date(raw).ok_or_else(|| invalid_date(raw))
}

fn day_arg(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), codecs::DATE_FORMAT).map_err(|_| invalid_date(raw))
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 || args.len() > 5 {
        return Err(usage_error(context, "add"));
    }
    let kind = TransactionKind::from_str(args[0])
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    let amount =
        parse_amount(args[1]).map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    let description = args.get(2).copied().unwrap_or_default();
    let category = args.get(3).copied().unwrap_or_default();
    let date = args.get(4).map(|raw| date_arg(raw)).transpose()?;

    let id = context
        .ledger
        .record(kind, amount, description, category, date);
    context.mark_dirty()?;
    output::success(format!(
        "Added {} #{}: {}",
        kind,
        id,
        context.format_amount(kind.sign() * amount.abs())
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_args(context, "list", args)?;
    let transactions: Vec<&Transaction> = context.ledger.iter().collect();
    print_transactions(context, "Transactions", &transactions);
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_args(context, "balance", args)?;
    let totals = Totals::from_transactions(context.ledger.iter());
    output::line(format!(
        "Balance:  {}",
        output::money(context.format_amount(totals.balance), totals.balance)
    ));
    output::line(format!("Income:   {}", context.format_amount(totals.income)));
    output::line(format!("Expenses: {}", context.format_amount(totals.expenses)));
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_args(context, "categories", args)?;
    let categories = context.ledger.categories();
    if categories.is_empty() {
        output::info("No categories yet.");
        return Ok(());
    }
    output::section("Categories");
    for category in categories {
        if category.is_empty() {
            output::line("(uncategorized)");
        } else {
            output::line(category);
        }
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = single_arg(context, "category", args)?;
    let transactions = context.ledger.by_category(name);
    print_transactions(context, &format!("Category `{}`", name), &transactions);
    Ok(())
}

fn cmd_range(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [start, end] = args else {
        return Err(usage_error(context, "range"));
    };
    let first = day_arg(start)?;
    let last = day_arg(end)?;
    if last < first {
        return Err(CommandError::InvalidArguments(
            "Range end is before its start.".into(),
        ));
    }
    let transactions = context.ledger.by_days(first, last);
    print_transactions(context, &format!("{} to {}", first, last), &transactions);
    Ok(())
}

fn cmd_import_csv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_arg(context, "import-csv", args)?;
    let options = context.import_options();
    let report = codecs::import_csv(&mut context.ledger, path, &options)?;
    finish_import(context, &report)
}

fn cmd_import_xlsx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_arg(context, "import-xlsx", args)?;
    let options = context.import_options();
    let report = codecs::import_xlsx(&mut context.ledger, path, &options)?;
    finish_import(context, &report)
}

fn finish_import(context: &mut ShellContext, report: &ImportReport) -> CommandResult {
    if report.imported > 0 {
        context.mark_dirty()?;
    }
    output::success(format!("Imported {} transaction(s).", report.imported));
    for skipped in &report.skipped {
        output::warning(format!("Row {} skipped: {}", skipped.row, skipped.reason));
    }
    if !report.defaulted_dates.is_empty() {
        let rows: Vec<String> = report.defaulted_dates.iter().map(usize::to_string).collect();
        output::warning(format!(
            "Unreadable dates replaced by the import time on row(s) {}.",
            rows.join(", ")
        ));
    }
    Ok(())
}

fn cmd_export_csv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_arg(context, "export-csv", args)?;
    codecs::export_csv(&context.ledger, path)?;
    output::success(format!("Exported {} transaction(s) to {}.", context.ledger.len(), path));
    Ok(())
}

fn cmd_export_xlsx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_arg(context, "export-xlsx", args)?;
    codecs::export_xlsx(&context.ledger, path)?;
    output::success(format!("Exported {} transaction(s) to {}.", context.ledger.len(), path));
    Ok(())
}

fn cmd_export_pdf(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = single_arg(context, "export-pdf", args)?;
    codecs::export_pdf(&context.ledger, path, &context.config.currency_symbol)?;
    output::success(format!("Report written to {}.", path));
    Ok(())
}

fn cmd_export_pdf_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path, year, month] = args else {
        return Err(usage_error(context, "export-pdf-month"));
    };
    let year: i32 = year
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("Invalid year `{}`.", year)))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("Invalid month `{}`.", month)))?;
    codecs::export_monthly_pdf(
        &context.ledger,
        path,
        year,
        month,
        &context.config.currency_symbol,
    )?;
    output::success(format!("Monthly report for {:02}/{} written to {}.", month, year, path));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_args(context, "save", args)?;
    context.save_ledger()?;
    output::success(format!("Saved to {}.", context.storage.path().display()));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = context.registry.find(&name.to_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("Unknown command `{}`.", name))
        })?;
        output::line(format!("{} - {}", entry.name, entry.description));
        output::line(format!("Usage: {}", entry.usage));
        if !entry.aliases.is_empty() {
            output::line(format!("Also: {}", entry.aliases.join(", ")));
        }
        return Ok(());
    }
    output::section("Commands");
    for entry in context.registry.iter() {
        output::line(format!("  {:<18} {}", entry.name, entry.description));
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn print_transactions(context: &ShellContext, title: &str, transactions: &[&Transaction]) {
    if transactions.is_empty() {
        output::info("No transactions found.");
        return;
    }
    output::section(title);
    for txn in transactions {
        output::line(format!(
            "#{:<4} {}  {:<8} {}  {:<14} {}",
            txn.id,
            txn.date.format(codecs::DATE_FORMAT),
            txn.kind.label(),
            output::money(
                format!("{:>14}", context.format_amount(txn.signed_amount())),
                txn.signed_amount()
            ),
            txn.category,
            txn.description
        ));
    }
    let totals = Totals::from_transactions(transactions.iter().copied());
    output::line(format!(
        "{} transaction(s), net {}",
        transactions.len(),
        context.format_amount(totals.balance)
    ));
}
