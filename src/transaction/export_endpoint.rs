//! Defines the endpoint for downloading the ledger as a CSV file.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, Error, amount::Amount, database_id::TransactionId};

use super::{
    Transaction,
    core::{SortOrder, list_transactions},
    view::format_time,
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A row in the exported CSV file. The field names are the CSV header.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: TransactionId,
    date: String,
    time: String,
    name: &'a str,
    comment: &'a str,
    amount_received: Amount,
    amount_paid: Amount,
    remaining_balance: Amount,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            id: transaction.id,
            date: transaction.date.to_string(),
            time: format_time(transaction.time),
            name: &transaction.name,
            comment: transaction.comment.as_deref().unwrap_or_default(),
            amount_received: transaction.amount_received,
            amount_paid: transaction.amount_paid,
            remaining_balance: transaction.remaining_balance,
        }
    }
}

/// Write `transactions` as CSV with a header row.
///
/// # Errors
/// Returns an [Error::CsvError] if a row could not be written.
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if transactions.is_empty() {
        writer
            .write_record([
                "id",
                "date",
                "time",
                "name",
                "comment",
                "amount_received",
                "amount_paid",
                "remaining_balance",
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    for transaction in transactions {
        writer
            .serialize(ExportRow::from(transaction))
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler that responds with every transaction, oldest first, as a CSV file.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_transactions(SortOrder::Ascending, &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    let csv = transactions_to_csv(&transactions)
        .inspect_err(|error| tracing::error!("could not export transactions: {error}"))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"ledger.csv\""),
        ],
        csv,
    )
        .into_response())
}
