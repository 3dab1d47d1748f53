//! Income/expense aggregates used by reports and the shell.

use std::collections::BTreeMap;

use super::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

impl Totals {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Totals::default();
        for txn in transactions {
            totals.add(txn);
        }
        totals
    }

    fn add(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionKind::Income => self.income += txn.amount,
            TransactionKind::Expense => self.expenses += txn.amount,
        }
        self.balance = self.income - self.expenses;
    }
}

/// Per-category income, expenses, and net.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// One entry per distinct category, sorted by label.
pub fn category_breakdown<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategoryTotals> {
    let mut grouped: BTreeMap<&str, Totals> = BTreeMap::new();
    for txn in transactions {
        grouped.entry(txn.category.as_str()).or_default().add(txn);
    }
    grouped
        .into_iter()
        .map(|(category, totals)| CategoryTotals {
            category: category.to_string(),
            income: totals.income,
            expenses: totals.expenses,
            net: totals.balance,
        })
        .collect()
}
