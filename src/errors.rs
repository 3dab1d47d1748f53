use thiserror::Error;

/// Error type that captures common ledger, storage, and codec failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Parse(String),
    #[error("Malformed file: {0}")]
    Format(String),
    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            LedgerError::Io(err.into())
        } else {
            LedgerError::Format(format!("JSON: {err}"))
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => LedgerError::Io(io),
            _ => LedgerError::Format(format!("CSV: {message}")),
        }
    }
}

impl From<calamine::Error> for LedgerError {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(io) => LedgerError::Io(io),
            other => LedgerError::Format(format!("spreadsheet: {other}")),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for LedgerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LedgerError::Export(format!("spreadsheet: {err}"))
    }
}

impl From<printpdf::Error> for LedgerError {
    fn from(err: printpdf::Error) -> Self {
        LedgerError::Export(format!("PDF: {err}"))
    }
}
