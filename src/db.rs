/*! This module sets up the application's database. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    balance::{find_balance_mismatch, write_running_balances},
    transaction::{SortOrder, create_transaction_table, list_transactions},
};

/// Create the tables for the ledger if they do not exist and repair the
/// stored running balances if any of them do not add up.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    let transactions = list_transactions(SortOrder::Ascending, &transaction)?;
    if let Some(mismatch) = find_balance_mismatch(&transactions) {
        tracing::warn!(
            "Stored balance for transaction #{} is {}, expected {}. Recomputing all balances.",
            mismatch.id,
            mismatch.actual,
            mismatch.expected
        );
        let updated = write_running_balances(&transaction)?;
        tracing::info!("Recomputed the running balance of {updated} transactions.");
    }

    transaction.commit()?;

    Ok(())
}
