//! Defines the endpoint for deleting a transaction and recomputing the balances after it.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, database_id::TransactionId};

use super::{core::delete_transaction, view::LEDGER_CHANGED_EVENT};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// On success, responds with an alert and triggers the ledger-changed event
/// so the page reloads the table with the recomputed balances.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => {
            tracing::info!("deleted transaction {transaction_id} and recomputed balances");

            (
                [(HX_TRIGGER, LEDGER_CHANGED_EVENT)],
                Alert::SuccessSimple {
                    message: "Transaction deleted successfully".to_owned(),
                }
                .into_oob_html(),
            )
                .into_response()
        }
        Err(Error::DeleteMissingTransaction) => {
            tracing::warn!("tried to delete missing transaction {transaction_id}");
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        amount::Amount,
        db::initialize,
        test_utils::{assert_status_ok, get_header},
        transaction::{
            NewTransaction, SortOrder, create_transaction,
            delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint},
            get_transaction, list_transactions,
        },
    };

    fn get_test_state() -> DeleteTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let now = datetime!(2025-08-25 14:30:00 +5);

        for (name, received, paid) in [("A", 10_000, 0), ("B", 0, 3_000), ("C", 1_000, 0)] {
            let new_transaction = NewTransaction::new(
                name,
                None,
                Some(Decimal::new(received, 2)),
                Some(Decimal::new(paid, 2)),
            )
            .unwrap();
            create_transaction(new_transaction, now, &conn).unwrap();
        }

        DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn balances(state: &DeleteTransactionState) -> Vec<Amount> {
        let connection = state.db_connection.lock().unwrap();
        list_transactions(SortOrder::Ascending, &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.remaining_balance)
            .collect()
    }

    #[tokio::test]
    async fn deletes_transaction_and_recomputes_balances() {
        let state = get_test_state();

        let response = delete_transaction_endpoint(State(state.clone()), Path(2)).await;

        assert_status_ok(&response);
        assert_eq!(get_header(&response, "hx-trigger"), "ledger-changed");
        assert_eq!(
            get_transaction(2, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
        assert_eq!(
            balances(&state),
            vec![Amount::from_cents(10_000), Amount::from_cents(11_000)]
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = get_test_state();
        let want_balances = balances(&state);

        let response = delete_transaction_endpoint(State(state.clone()), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(balances(&state), want_balances);
    }
}
