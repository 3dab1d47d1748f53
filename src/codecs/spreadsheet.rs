//! XLSX import/export. Same columns as the CSV codec, first sheet only.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::errors::LedgerError;
use crate::ledger::Ledger;
use crate::utils::persistence::write_atomic;

use super::{
    import_rows, require_data_rows, ExportRow, ImportOptions, ImportReport, DATE_FORMAT,
    EXPORT_HEADER,
};

const SHEET_NAME: &str = "Sheet1";
const COLUMN_WIDTH: f64 = 15.0;

/// Appends the rows of the workbook's first sheet to `ledger`.
pub fn import_xlsx(
    ledger: &mut Ledger,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportReport, LedgerError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LedgerError::Format("spreadsheet has no sheets".into()))??;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows: Vec<(usize, Vec<String>)> = range
        .rows()
        .enumerate()
        .skip(1)
        .map(|(offset, cells)| (first_row + offset + 1, row_text(cells)))
        .collect();
    require_data_rows(rows.len(), "Spreadsheet")?;

    let source = path.display().to_string();
    Ok(import_rows(ledger, rows, options, &source))
}

// Ranges are rectangular; trailing empty cells are not fields.
fn row_text(cells: &[Data]) -> Vec<String> {
    let used = cells
        .iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    cells[..used].iter().map(cell_text).collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::DateTimeIso(text) => text.split('T').next().unwrap_or_default().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Writes every transaction to `Sheet1` with a bold header row.
pub fn export_xlsx(ledger: &Ledger, path: impl AsRef<Path>) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header_format)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (idx, txn) in ledger.iter().enumerate() {
        let row = (idx + 1) as u32;
        let cells = ExportRow::from(txn);
        sheet.write_string(row, 0, cells.date.as_str())?;
        sheet.write_number(row, 1, cells.amount)?;
        sheet.write_string(row, 2, cells.description)?;
        sheet.write_string(row, 3, cells.category)?;
        sheet.write_string(row, 4, cells.kind)?;
    }

    let data = workbook.save_to_buffer()?;
    write_atomic(path, &data)?;
    tracing::info!(path = %path.display(), rows = ledger.len(), "spreadsheet exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{parse_date, SkipReason};
    use crate::ledger::TransactionKind;
    use tempfile::tempdir;

    #[test]
    fn export_then_import_reproduces_transactions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.xlsx");
        let mut original = Ledger::new();
        original.record(TransactionKind::Income, 1000.0, "Salary", "Work", parse_date("2024-01-05"));
        original.record(TransactionKind::Expense, 200.5, "", "Groceries", parse_date("2024-01-09"));
        export_xlsx(&original, &path).unwrap();

        let mut restored = Ledger::new();
        let report = import_xlsx(&mut restored, &path, &ImportOptions::default()).unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(restored.transactions()[1].kind, TransactionKind::Expense);
        assert_eq!(restored.transactions()[1].amount, 200.5);
        assert_eq!(restored.transactions()[1].description, "");
        assert_eq!(restored.transactions()[0].date, original.transactions()[0].date);
        assert_eq!(restored.balance(), original.balance());
    }

    #[test]
    fn short_and_invalid_rows_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, title) in ["Date", "Value", "Description", "Category"].iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        sheet.write_string(1, 0, "2024-02-01").unwrap();
        sheet.write_number(1, 1, -30.0).unwrap();
        sheet.write_string(1, 2, "Taxi").unwrap();
        sheet.write_string(1, 3, "Transport").unwrap();
        sheet.write_string(2, 0, "2024-02-02").unwrap();
        sheet.write_string(2, 1, "n/a").unwrap();
        sheet.write_string(2, 2, "Broken").unwrap();
        sheet.write_string(2, 3, "Misc").unwrap();
        sheet.write_string(3, 0, "2024-02-03").unwrap();
        sheet.write_number(3, 1, 5.0).unwrap();
        workbook.save(&path).unwrap();

        let mut ledger = Ledger::new();
        let report = import_xlsx(&mut ledger, &path, &ImportOptions::default()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].row, 3);
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidAmount("n/a".into()));
        assert_eq!(report.skipped[1].reason, SkipReason::MissingFields(2));
        assert_eq!(ledger.balance(), -30.0);
    }

    #[test]
    fn zero_value_expense_keeps_its_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero.xlsx");
        let mut original = Ledger::new();
        original.record(TransactionKind::Expense, 0.0, "Free sample", "Food", parse_date("2024-02-01"));
        export_xlsx(&original, &path).unwrap();

        let mut restored = Ledger::new();
        let report = import_xlsx(&mut restored, &path, &ImportOptions::default()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(restored.transactions()[0].kind, TransactionKind::Expense);
        assert_eq!(restored.transactions()[0].amount, 0.0);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let mut ledger = Ledger::new();
        assert!(import_xlsx(&mut ledger, "/no/such/book.xlsx", &ImportOptions::default()).is_err());
    }
}
