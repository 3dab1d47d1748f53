use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::LedgerError;

/// Income/expense classification of a ledger record.
///
/// The serialized labels are shared by the JSON store and the CSV/XLSX
/// `Type` column, so existing data files keep loading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "Receita")]
    Income,
    #[serde(rename = "Despesa")]
    Expense,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Receita",
            TransactionKind::Expense => "Despesa",
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            TransactionKind::Income => 1.0,
            TransactionKind::Expense => -1.0,
        }
    }

    /// Kind implied by a signed amount, as found in imported files.
    /// A negative zero (`-0.00`) is a zero-value expense.
    pub fn from_signed(amount: f64) -> Self {
        if amount.is_sign_negative() {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "receita" | "income" => Ok(TransactionKind::Income),
            "despesa" | "expense" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::Parse(format!(
                "unknown transaction kind `{}` (use income or expense)",
                other
            ))),
        }
    }
}

/// A single ledger record. `amount` is always the unsigned magnitude.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "value", deserialize_with = "magnitude")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub date: DateTime<FixedOffset>,
}

impl Transaction {
    pub fn new(
        id: u64,
        kind: TransactionKind,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            kind,
            amount: amount.abs(),
            description: description.into(),
            category: category.into(),
            date,
        }
    }

    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

// Older stores kept expenses pre-negated in `value`.
fn magnitude<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.abs())
}

/// Hands out process-unique transaction ids, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// The last id, `u64::MAX`, is handed out again once exhausted.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    /// Moves the sequence past `id` so it is never handed out again.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
