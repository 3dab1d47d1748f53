use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::transaction::{IdSequence, Transaction, TransactionKind};
use crate::errors::LedgerError;

/// Ordered, append-only collection of transactions for one store.
///
/// Serializes as `{ "transactions": [...] }`. The id sequence is not stored;
/// it is rebuilt from the highest persisted id on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LedgerDocument")]
pub struct Ledger {
    transactions: Vec<Transaction>,
    #[serde(skip)]
    ids: IdSequence,
}

#[derive(Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl From<LedgerDocument> for Ledger {
    fn from(document: LedgerDocument) -> Self {
        Ledger::from_transactions(document.transactions)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            ids: IdSequence::new(),
        }
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut ids = IdSequence::new();
        for txn in &transactions {
            ids.observe(txn.id);
        }
        Self { transactions, ids }
    }

    /// Builds a transaction with the next id without appending it.
    /// `date` defaults to the current local time.
    pub fn create(
        &mut self,
        kind: TransactionKind,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        date: Option<DateTime<FixedOffset>>,
    ) -> Transaction {
        let date = date.unwrap_or_else(|| Local::now().fixed_offset());
        Transaction::new(
            self.ids.next_id(),
            kind,
            amount,
            description,
            category,
            date,
        )
    }

    pub fn append(&mut self, transaction: Transaction) {
        tracing::debug!(id = transaction.id, kind = %transaction.kind, "appending transaction");
        self.ids.observe(transaction.id);
        self.transactions.push(transaction);
    }

    /// Creates and appends in one step, returning the assigned id.
    pub fn record(
        &mut self,
        kind: TransactionKind,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        date: Option<DateTime<FixedOffset>>,
    ) -> u64 {
        let txn = self.create(kind, amount, description, category, date);
        let id = txn.id;
        self.append(txn);
        id
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    pub fn balance(&self) -> f64 {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    /// Transactions with `start <= date <= end`, in insertion order.
    pub fn by_date_range<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.date >= *start && txn.date <= *end)
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.category == category)
            .collect()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.transactions
            .iter()
            .map(|txn| txn.category.as_str())
            .collect()
    }

    /// Transactions whose calendar day, in the offset they were recorded
    /// with, falls within `first..=last`. This is the day `list` shows.
    pub fn by_days(&self, first: NaiveDate, last: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| (first..=last).contains(&txn.date.date_naive()))
            .collect()
    }

    pub fn by_month(&self, year: i32, month: u32) -> Result<Vec<&Transaction>, LedgerError> {
        let (first, last) = month_days(year, month)?;
        Ok(self.by_days(first, last))
    }
}

/// First and last day of a calendar month.
pub fn month_days(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), LedgerError> {
    let invalid = || LedgerError::Parse(format!("invalid month {}/{}", month, year));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}
