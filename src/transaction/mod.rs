//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for validated user input
//! - Database functions for storing, querying, and deleting transactions
//! - Filters and totals for the ledger
//! - View handlers for the ledger page, the printable report and the CSV export

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export_endpoint;
mod filter;
mod form;
mod ledger_page;
mod report_page;
mod summary;
mod view;

pub use core::{
    MAX_NAME_LENGTH, NewTransaction, SortOrder, Transaction, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, distinct_dates,
    get_transaction, list_transactions, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use export_endpoint::{export_transactions_endpoint, transactions_to_csv};
pub use filter::{FilterOptions, LedgerFilter};
pub use ledger_page::get_ledger_page;
pub use report_page::get_report_page;
pub use summary::LedgerSummary;
