//! Defines the route handler for the main ledger page.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// axum_extra's Query parses an empty string as None, which the filter form
// sends for "All months" and "All years".
use axum_extra::extract::Query;
use rusqlite::Connection;

use crate::{AppState, Error, balance::current_balance, timezone::local_now};

use super::{
    core::{SortOrder, distinct_dates, list_transactions},
    filter::{FilterOptions, LedgerFilter},
    summary::LedgerSummary,
    view::{LedgerView, ledger_view},
};

/// The state needed for the ledger page.
#[derive(Debug, Clone)]
pub struct LedgerPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for LedgerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the ledger, newest transactions first, narrowed down by `filter`.
pub async fn get_ledger_page(
    State(state): State<LedgerPageState>,
    Query(filter): Query<LedgerFilter>,
) -> Result<Response, Error> {
    let local_now = local_now(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(SortOrder::Descending, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let current_balance = current_balance(&connection)
        .inspect_err(|error| tracing::error!("could not get current balance: {error}"))?;
    let dates = distinct_dates(&connection)
        .inspect_err(|error| tracing::error!("could not get transaction dates: {error}"))?;
    drop(connection);

    let transactions = filter.apply(transactions);
    let summary = LedgerSummary::from_transactions(&transactions);
    let filter_options = FilterOptions::from_dates(&dates);

    Ok(ledger_view(LedgerView {
        transactions: &transactions,
        filter: &filter,
        filter_options: &filter_options,
        summary,
        current_balance,
        local_now,
        timezone: &state.local_timezone,
    })
    .into_response())
}
