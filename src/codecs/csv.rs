//! CSV import/export: `Date, Value, Description, Category, Type`.

use std::path::Path;

use crate::errors::LedgerError;
use crate::ledger::Ledger;
use crate::utils::persistence::write_atomic;

use super::{import_rows, require_data_rows, ExportRow, ImportOptions, ImportReport, EXPORT_HEADER};

/// Appends the rows of a CSV file to `ledger`. The first row is a header.
/// Cells that are not valid UTF-8 are decoded lossily.
pub fn import_csv(
    ledger: &mut Ledger,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportReport, LedgerError> {
    let path = path.as_ref();
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, result) in reader.byte_records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(index + 2);
        let cells: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect();
        rows.push((row, cells));
    }
    require_data_rows(rows.len(), "CSV")?;

    let source = path.display().to_string();
    Ok(import_rows(ledger, rows, options, &source))
}

/// Writes every transaction, in ledger order, with signed amounts.
pub fn export_csv(ledger: &Ledger, path: impl AsRef<Path>) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for txn in ledger.iter() {
        let row = ExportRow::from(txn);
        let amount = format!("{:.2}", row.amount);
        writer.write_record([
            row.date.as_str(),
            amount.as_str(),
            row.description,
            row.category,
            row.kind,
        ])?;
    }
    let data = writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))?;
    write_atomic(path, &data)?;
    tracing::info!(path = %path.display(), rows = ledger.len(), "CSV exported");
    Ok(())
}
