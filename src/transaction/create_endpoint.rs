//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    amount::parse_decimal,
    endpoints,
    error::ValidationError,
    timezone::local_now,
    transaction::core::{NewTransaction, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Who or what the transaction was with.
    #[serde(default)]
    pub name: String,
    /// An optional note.
    #[serde(default)]
    pub comment: Option<String>,
    /// The money that came in, as typed by the user.
    #[serde(default)]
    pub amount_received: Option<String>,
    /// The money that went out, as typed by the user.
    #[serde(default)]
    pub amount_paid: Option<String>,
}

impl TransactionForm {
    /// Validate the form into a [NewTransaction].
    ///
    /// Blank amounts count as missing, and an amount that is not a plain
    /// decimal is a [ValidationError::InvalidAmount].
    fn validate(&self) -> Result<NewTransaction, ValidationError> {
        let parse = |text: &Option<String>| {
            text.as_deref()
                .filter(|text| !text.trim().is_empty())
                .map(parse_decimal)
                .transpose()
        };
        let amount_received = parse(&self.amount_received)?;
        let amount_paid = parse(&self.amount_paid)?;

        NewTransaction::new(
            &self.name,
            self.comment.as_deref(),
            amount_received,
            amount_paid,
        )
    }
}

/// A route handler for creating a new transaction, redirects to the ledger on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("rejected transaction form {form:?}: {error}");
            return Error::from(error).into_alert_response();
        }
    };

    let local_now = match local_now(&state.local_timezone) {
        Ok(local_now) => local_now,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(new_transaction, local_now, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "created transaction {} with balance {}",
                transaction.id,
                transaction.remaining_balance
            );
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(endpoints::LEDGER_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
