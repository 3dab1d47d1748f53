#![doc(test(attr(deny(warnings))))]

//! Finance Tracker keeps a personal ledger of income and expense
//! transactions, persists it as JSON, and converts it to and from CSV, XLSX,
//! and PDF reports.

pub mod cli;
pub mod codecs;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Tracker tracing initialized.");
    });
}
