//! PDF reports: summary, transaction table, and per-category breakdown.
//!
//! The report content is assembled as a [`ReportModel`] first, so the
//! sections can be checked without parsing PDF output. Rendering lays the
//! model out on A4 pages with the built-in Helvetica fonts.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::errors::LedgerError;
use crate::ledger::{category_breakdown, CategoryTotals, Ledger, Totals, Transaction};
use crate::utils::persistence::write_atomic;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const LAYER_NAME: &str = "Layer 1";
const PT_TO_MM: f32 = 0.3528;

const TRANSACTION_COLUMNS: [(&str, f32); 5] = [
    ("Date", 25.0),
    ("Type", 20.0),
    ("Value", 25.0),
    ("Description", 70.0),
    ("Category", 30.0),
];
const CATEGORY_COLUMNS: [(&str, f32); 4] = [
    ("Category", 60.0),
    ("Income", 40.0),
    ("Expenses", 40.0),
    ("Net", 40.0),
];

/// One line of the transaction table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: String,
    pub kind: &'static str,
    pub amount: f64,
    pub description: String,
    pub category: String,
}

impl From<&Transaction> for ReportRow {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.date.format("%d/%m/%Y").to_string(),
            kind: txn.kind.label(),
            amount: txn.signed_amount(),
            description: txn.description.clone(),
            category: txn.category.clone(),
        }
    }
}

/// Everything a report shows, independent of the PDF layout.
#[derive(Debug, Clone)]
pub struct ReportModel {
    pub title: String,
    pub totals: Totals,
    pub rows: Vec<ReportRow>,
    pub categories: Vec<CategoryTotals>,
    pub generated_at: DateTime<Local>,
}

impl ReportModel {
    pub fn from_transactions(title: impl Into<String>, transactions: &[&Transaction]) -> Self {
        Self {
            title: title.into(),
            totals: Totals::from_transactions(transactions.iter().copied()),
            rows: transactions.iter().map(|txn| ReportRow::from(*txn)).collect(),
            categories: category_breakdown(transactions.iter().copied()),
            generated_at: Local::now(),
        }
    }

    pub fn full(ledger: &Ledger) -> Self {
        let transactions: Vec<&Transaction> = ledger.iter().collect();
        Self::from_transactions("Financial Report", &transactions)
    }

    /// Same sections, restricted to one calendar month.
    pub fn monthly(ledger: &Ledger, year: i32, month: u32) -> Result<Self, LedgerError> {
        let transactions = ledger.by_month(year, month)?;
        let month_name = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| date.format("%B").to_string())
            .unwrap_or_default();
        Ok(Self::from_transactions(
            format!("Monthly Report - {}/{}", month_name, year),
            &transactions,
        ))
    }

    pub fn render(&self, currency: &str) -> Result<Vec<u8>, LedgerError> {
        let page = self.layout(currency)?;
        tracing::debug!(title = %self.title, pages = page.pages, "report laid out");
        page.finish()
    }

    fn layout(&self, currency: &str) -> Result<PageWriter, LedgerError> {
        let mut page = PageWriter::new(&self.title)?;
        let money = |value: f64| format!("{} {:.2}", currency, value);

        page.text(&self.title, 16.0, FontStyle::Bold);
        page.gap(5.0);

        page.text("Summary", 12.0, FontStyle::Bold);
        page.text(&format!("Total balance: {}", money(self.totals.balance)), 10.0, FontStyle::Regular);
        page.text(&format!("Total income: {}", money(self.totals.income)), 10.0, FontStyle::Regular);
        page.text(&format!("Total expenses: {}", money(self.totals.expenses)), 10.0, FontStyle::Regular);
        page.gap(4.0);

        page.text("Transactions", 12.0, FontStyle::Bold);
        page.header_row(&TRANSACTION_COLUMNS, 9.0);
        for row in &self.rows {
            let cells = [
                row.date.clone(),
                row.kind.to_string(),
                money(row.amount),
                row.description.clone(),
                row.category.clone(),
            ];
            page.row(&TRANSACTION_COLUMNS, &cells, 8.0);
        }
        page.gap(6.0);

        page.text("Summary by Category", 12.0, FontStyle::Bold);
        page.header_row(&CATEGORY_COLUMNS, 9.0);
        for entry in &self.categories {
            let cells = [
                entry.category.clone(),
                money(entry.income),
                money(entry.expenses),
                money(entry.net),
            ];
            page.row(&CATEGORY_COLUMNS, &cells, 8.0);
        }
        page.gap(6.0);

        page.text(
            &format!("Generated at: {}", self.generated_at.format("%d/%m/%Y %H:%M:%S")),
            8.0,
            FontStyle::Italic,
        );
        Ok(page)
    }
}

pub fn export_pdf(ledger: &Ledger, path: impl AsRef<Path>, currency: &str) -> Result<(), LedgerError> {
    let model = ReportModel::full(ledger);
    write_report(&model, path.as_ref(), currency)
}

pub fn export_monthly_pdf(
    ledger: &Ledger,
    path: impl AsRef<Path>,
    year: i32,
    month: u32,
    currency: &str,
) -> Result<(), LedgerError> {
    let model = ReportModel::monthly(ledger, year, month)?;
    write_report(&model, path.as_ref(), currency)
}

fn write_report(model: &ReportModel, path: &Path, currency: &str) -> Result<(), LedgerError> {
    let data = model.render(currency)?;
    write_atomic(path, &data)?;
    tracing::info!(
        path = %path.display(),
        title = %model.title,
        rows = model.rows.len(),
        "PDF report exported"
    );
    Ok(())
}

#[derive(Clone, Copy)]
enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Cursor over the current page; starts a new page when space runs out.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, LedgerError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }

    fn advance(&mut self, size: f32) {
        let height = size * PT_TO_MM * 1.5;
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
            self.pages += 1;
        }
        self.y -= height;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn text(&mut self, text: &str, size: f32, style: FontStyle) {
        self.advance(size);
        let font = self.font(style).clone();
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), &font);
    }

    fn header_row(&mut self, columns: &[(&str, f32)], size: f32) {
        let titles: Vec<String> = columns.iter().map(|(title, _)| title.to_string()).collect();
        self.cells(columns, &titles, size, FontStyle::Bold);
    }

    fn row(&mut self, columns: &[(&str, f32)], cells: &[String], size: f32) {
        self.cells(columns, cells, size, FontStyle::Regular);
    }

    fn cells(&mut self, columns: &[(&str, f32)], cells: &[String], size: f32, style: FontStyle) {
        self.advance(size);
        let font = self.font(style).clone();
        let mut x = MARGIN;
        for ((_, width), cell) in columns.iter().zip(cells) {
            let text = fit(cell, *width, size);
            self.layer.use_text(text, size, Mm(x), Mm(self.y), &font);
            x += width;
        }
    }

    fn finish(self) -> Result<Vec<u8>, LedgerError> {
        Ok(self.doc.save_to_bytes()?)
    }
}

// Helvetica glyphs average about half an em.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = ((width - 1.0) / (size * PT_TO_MM * 0.5)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::parse_date;
    use crate::ledger::TransactionKind;
    use tempfile::tempdir;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.record(TransactionKind::Income, 1000.0, "Salary", "Work", parse_date("2024-03-01"));
        ledger.record(TransactionKind::Expense, 200.0, "", "Groceries", parse_date("2024-03-31"));
        ledger.record(TransactionKind::Expense, 80.0, "Gym", "Health", parse_date("2024-04-02"));
        ledger
    }

    #[test]
    fn full_report_covers_every_transaction() {
        let model = ReportModel::full(&ledger());
        assert_eq!(model.title, "Financial Report");
        assert_eq!(model.rows.len(), 3);
        assert_eq!(model.totals.income, 1000.0);
        assert_eq!(model.totals.expenses, 280.0);
        assert_eq!(model.totals.balance, 720.0);
        assert_eq!(model.rows[1].date, "31/03/2024");
        assert_eq!(model.rows[1].kind, "Despesa");
        assert_eq!(model.rows[1].amount, -200.0);
        let names: Vec<&str> = model.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Groceries", "Health", "Work"]);
    }

    #[test]
    fn monthly_report_filters_to_the_month() {
        let model = ReportModel::monthly(&ledger(), 2024, 3).unwrap();
        assert_eq!(model.title, "Monthly Report - March/2024");
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.totals.balance, 800.0);
        assert_eq!(model.categories.len(), 2);
        assert!(ReportModel::monthly(&ledger(), 2024, 0).is_err());
    }

    #[test]
    fn export_writes_a_pdf_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        export_pdf(&ledger(), &path, "R$").unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_ledgers_spill_onto_more_pages() {
        let mut ledger = Ledger::new();
        for i in 0..150 {
            ledger.record(TransactionKind::Expense, i as f64, format!("item {i}"), "Bulk", None);
        }
        assert_eq!(ReportModel::full(&ledger).layout("$").unwrap().pages, 3);

        let dir = tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        export_pdf(&ledger, &path, "$").unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn short_reports_fit_on_one_page() {
        assert_eq!(ReportModel::full(&ledger()).layout("R$").unwrap().pages, 1);
    }

    #[test]
    fn fit_clips_long_cells() {
        assert_eq!(fit("short", 70.0, 8.0), "short");
        let clipped = fit(&"x".repeat(200), 25.0, 8.0);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() < 200);
    }
}
