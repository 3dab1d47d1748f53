use finance_tracker::{
    codecs::{export_csv, export_xlsx, import_csv, import_xlsx, DateFallback, ImportOptions, ReportModel},
    ledger::{Ledger, TransactionKind},
};
use std::fs;
use tempfile::tempdir;

#[test]
fn csv_to_xlsx_and_back_keeps_the_ledger() {
    let temp = tempdir().unwrap();
    let csv = temp.path().join("in.csv");
    fs::write(
        &csv,
        "Date,Value,Description,Category\n\
         2024-04-01,\"3200,00\",Salary,Work\n\
         2024-04-02,-120.40,Power bill,Utilities\n\
         not-a-date,-15,Snack,Food\n",
    )
    .unwrap();

    let mut ledger = Ledger::new();
    let report = import_csv(&mut ledger, &csv, &ImportOptions::default()).unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(report.defaulted_dates, vec![4]);

    let xlsx = temp.path().join("out.xlsx");
    export_xlsx(&ledger, &xlsx).unwrap();
    let mut copy = Ledger::new();
    import_xlsx(&mut copy, &xlsx, &ImportOptions::default()).unwrap();

    assert_eq!(copy.len(), ledger.len());
    assert!((copy.balance() - ledger.balance()).abs() < 1e-9);
    let kinds: Vec<_> = copy.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TransactionKind::Income, TransactionKind::Expense, TransactionKind::Expense]
    );
}

#[test]
fn strict_import_skips_rows_with_bad_dates() {
    let temp = tempdir().unwrap();
    let csv = temp.path().join("in.csv");
    fs::write(&csv, "Date,Value,Description,Category\n2024/04/01,10,a,b\n2024-04-02,10,c,d\n").unwrap();
    let options = ImportOptions {
        date_fallback: DateFallback::Skip,
    };
    let mut ledger = Ledger::new();
    let report = import_csv(&mut ledger, &csv, &options).unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row, 2);
}

#[test]
fn failed_export_leaves_no_partial_file() {
    let temp = tempdir().unwrap();
    let mut ledger = Ledger::new();
    ledger.record(TransactionKind::Income, 1.0, "", "", None);
    // A regular file where the parent directory should be.
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    assert!(export_csv(&ledger, blocker.join("out.csv")).is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "");
}

#[test]
fn monthly_report_uses_the_calendar_month() {
    let temp = tempdir().unwrap();
    let csv = temp.path().join("in.csv");
    fs::write(
        &csv,
        "Date,Value,Description,Category\n2024-01-31,100,a,X\n2024-02-01,-40,b,Y\n2024-02-29,-10,c,Y\n2024-03-01,5,d,Z\n",
    )
    .unwrap();
    let mut ledger = Ledger::new();
    import_csv(&mut ledger, &csv, &ImportOptions::default()).unwrap();

    let model = ReportModel::monthly(&ledger, 2024, 2).unwrap();
    assert_eq!(model.rows.len(), 2);
    assert_eq!(model.totals.expenses, 50.0);
    assert_eq!(model.categories.len(), 1);
    assert_eq!(model.categories[0].net, -50.0);
}
