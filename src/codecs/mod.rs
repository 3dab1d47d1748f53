//! Converters between the ledger and external files (CSV, XLSX, PDF).
//!
//! Importers share the row rules in this module: `[date, amount, description,
//! category]`, header skipped, amount sign deciding the kind. Importers parse
//! the whole file before touching the ledger, so a read failure appends
//! nothing.

pub mod csv;
pub mod pdf;
pub mod spreadsheet;

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ledger::{Ledger, Transaction, TransactionKind};

pub use self::csv::{export_csv, import_csv};
pub use self::pdf::{export_monthly_pdf, export_pdf, ReportModel};
pub use self::spreadsheet::{export_xlsx, import_xlsx};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const EXPORT_HEADER: [&str; 5] = ["Date", "Value", "Description", "Category", "Type"];
const MIN_FIELDS: usize = 4;

/// What to do with a row whose date does not match `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    /// Use the import time.
    #[default]
    Now,
    /// Skip the row and report it.
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub date_fallback: DateFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingFields(usize),
    InvalidAmount(String),
    InvalidDate(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields(found) => {
                write!(f, "expected at least {MIN_FIELDS} fields, found {found}")
            }
            SkipReason::InvalidAmount(raw) => write!(f, "invalid amount `{raw}`"),
            SkipReason::InvalidDate(raw) => write!(f, "invalid date `{raw}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number in the source; the header is row 1.
    pub row: usize,
    pub reason: SkipReason,
}

/// Outcome of an import: appended count plus everything that was not clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    /// Rows whose date could not be parsed and was replaced by the import time.
    pub defaulted_dates: Vec<usize>,
}

/// A data row that passed validation, not yet assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedRow {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: DateTime<FixedOffset>,
    pub date_defaulted: bool,
}

/// Applies the shared row rules to one data row's cells.
pub(crate) fn parse_row<S: AsRef<str>>(
    fields: &[S],
    options: &ImportOptions,
    now: DateTime<FixedOffset>,
) -> Result<ParsedRow, SkipReason> {
    if fields.len() < MIN_FIELDS {
        return Err(SkipReason::MissingFields(fields.len()));
    }
    let raw_date = fields[0].as_ref().trim();
    let raw_amount = fields[1].as_ref().trim();

    let signed = parse_amount(raw_amount)
        .map_err(|_| SkipReason::InvalidAmount(raw_amount.to_string()))?;

    let (date, date_defaulted) = match parse_date(raw_date) {
        Some(date) => (date, false),
        None => match options.date_fallback {
            DateFallback::Now => (now, true),
            DateFallback::Skip => return Err(SkipReason::InvalidDate(raw_date.to_string())),
        },
    };

    Ok(ParsedRow {
        kind: TransactionKind::from_signed(signed),
        amount: signed.abs(),
        description: fields[2].as_ref().trim().to_string(),
        category: fields[3].as_ref().trim().to_string(),
        date,
        date_defaulted,
    })
}

/// Parses a decimal amount, accepting a decimal comma.
pub fn parse_amount(raw: &str) -> Result<f64, LedgerError> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LedgerError::Parse(format!("invalid amount `{}`", raw.trim()))),
    }
}

/// `YYYY-MM-DD` at midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
}

/// Validates every row, then appends the accepted ones in order.
pub(crate) fn import_rows<I, R, S>(
    ledger: &mut Ledger,
    rows: I,
    options: &ImportOptions,
    source: &str,
) -> ImportReport
where
    I: IntoIterator<Item = (usize, R)>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let now = Local::now().fixed_offset();
    let mut report = ImportReport::default();
    let mut accepted = Vec::new();

    for (row, cells) in rows {
        match parse_row(cells.as_ref(), options, now) {
            Ok(parsed) => {
                if parsed.date_defaulted {
                    tracing::warn!(source, row, "unparsable date, using import time");
                    report.defaulted_dates.push(row);
                }
                accepted.push(parsed);
            }
            Err(reason) => {
                tracing::warn!(source, row, %reason, "skipping row");
                report.skipped.push(SkippedRow { row, reason });
            }
        }
    }

    for parsed in accepted {
        let txn = ledger.create(
            parsed.kind,
            parsed.amount,
            parsed.description,
            parsed.category,
            Some(parsed.date),
        );
        ledger.append(txn);
        report.imported += 1;
    }

    tracing::info!(
        source,
        imported = report.imported,
        skipped = report.skipped.len(),
        "import finished"
    );
    report
}

pub(crate) fn require_data_rows(count: usize, format: &str) -> Result<(), LedgerError> {
    if count == 0 {
        return Err(LedgerError::Format(format!(
            "{format} file must have at least a header and one data row"
        )));
    }
    Ok(())
}

/// Cells of one export row, shared by the CSV and XLSX writers.
pub(crate) struct ExportRow<'a> {
    pub date: String,
    pub amount: f64,
    pub description: &'a str,
    pub category: &'a str,
    pub kind: &'static str,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            date: txn.date.format(DATE_FORMAT).to_string(),
            amount: txn.signed_amount(),
            description: &txn.description,
            category: &txn.category,
            kind: txn.kind.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<FixedOffset> {
        parse_date("2030-06-01").unwrap()
    }

    #[test]
    fn amount_accepts_decimal_comma_and_sign() {
        assert_eq!(parse_amount(" -12,50 ").unwrap(), -12.5);
        assert_eq!(parse_amount("3").unwrap(), 3.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("1.234,56").is_err());
    }

    #[test]
    fn negative_amount_becomes_expense_magnitude() {
        let row = parse_row(&["2024-02-03", "-45,90", " Market ", "Food"], &ImportOptions::default(), now())
            .unwrap();
        assert_eq!(row.kind, TransactionKind::Expense);
        assert_eq!(row.amount, 45.9);
        assert_eq!(row.description, "Market");
        assert_eq!(row.date.format(DATE_FORMAT).to_string(), "2024-02-03");
        assert!(!row.date_defaulted);
    }

    #[test]
    fn short_rows_are_rejected() {
        let err = parse_row(&["2024-02-03", "10", "x"], &ImportOptions::default(), now()).unwrap_err();
        assert_eq!(err, SkipReason::MissingFields(3));
    }

    #[test]
    fn bad_date_falls_back_or_skips_per_options() {
        let cells = ["03/02/2024", "10", "", ""];
        let row = parse_row(&cells, &ImportOptions::default(), now()).unwrap();
        assert!(row.date_defaulted);
        assert_eq!(row.date, now());

        let strict = ImportOptions {
            date_fallback: DateFallback::Skip,
        };
        assert_eq!(
            parse_row(&cells, &strict, now()).unwrap_err(),
            SkipReason::InvalidDate("03/02/2024".into())
        );
    }

    #[test]
    fn import_rows_reports_skips_and_keeps_valid_rows() {
        let mut ledger = Ledger::new();
        let rows = vec![
            (2, vec!["2024-01-01", "100", "a", "A"]),
            (3, vec!["2024-01-02", "oops", "b", "B"]),
            (4, vec!["2024-01-03", "-5", "c", "C"]),
        ];
        let report = import_rows(&mut ledger, rows, &ImportOptions::default(), "test");
        assert_eq!(report.imported, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedRow {
                row: 3,
                reason: SkipReason::InvalidAmount("oops".into())
            }]
        );
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.balance(), 95.0);
    }
}
