//! The running balance engine.
//!
//! Each transaction stores the balance of the ledger right after it was
//! recorded. Ordered by ascending ID, the balances form a prefix sum of
//! `amount_received - amount_paid` that starts from zero:
//!
//! ```text
//! remaining_balance[i] = remaining_balance[i - 1] + amount_received[i] - amount_paid[i]
//! ```
//!
//! Creating a transaction only needs the balance of the latest transaction
//! (see [append_balance]), but deleting a transaction invalidates the balance
//! of every later transaction, so deletions recompute the whole ledger.

use rusqlite::{Connection, OptionalExtension, named_params};

use crate::{
    Error,
    amount::Amount,
    database_id::TransactionId,
    transaction::{SortOrder, Transaction, list_transactions},
};

/// The balance after applying a transaction on top of `previous_balance`.
pub fn append_balance(previous_balance: Amount, received: Amount, paid: Amount) -> Amount {
    previous_balance + received - paid
}

/// Set the remaining balance of each transaction to the running total.
///
/// `transactions` must be sorted by ID in ascending order.
pub fn apply_running_balances(transactions: &mut [Transaction]) {
    let mut running_balance = Amount::ZERO;

    for transaction in transactions {
        running_balance = append_balance(
            running_balance,
            transaction.amount_received,
            transaction.amount_paid,
        );
        transaction.remaining_balance = running_balance;
    }
}

/// The first transaction whose stored balance disagrees with the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceMismatch {
    /// The ID of the offending transaction.
    pub id: TransactionId,
    /// The balance the transaction should have.
    pub expected: Amount,
    /// The balance stored on the transaction.
    pub actual: Amount,
}

/// Check the stored balances of `transactions` against the running total.
///
/// `transactions` must be sorted by ID in ascending order.
/// Returns `None` if every balance is consistent.
pub fn find_balance_mismatch(transactions: &[Transaction]) -> Option<BalanceMismatch> {
    let mut running_balance = Amount::ZERO;

    for transaction in transactions {
        running_balance = append_balance(
            running_balance,
            transaction.amount_received,
            transaction.amount_paid,
        );

        if transaction.remaining_balance != running_balance {
            return Some(BalanceMismatch {
                id: transaction.id,
                expected: running_balance,
                actual: transaction.remaining_balance,
            });
        }
    }

    None
}

/// The remaining balance of the latest transaction, or zero for an empty ledger.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn current_balance(connection: &Connection) -> Result<Amount, Error> {
    let balance = connection
        .query_row(
            "SELECT remaining_balance FROM \"transaction\" ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(balance.unwrap_or(Amount::ZERO))
}

/// Recompute the remaining balance of every transaction and store the results.
///
/// All updates are written in a single SQL transaction, so either every
/// balance is updated or none are.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn recompute_all(connection: &Connection) -> Result<(), Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let sql_transaction = connection.unchecked_transaction()?;
    let count = write_running_balances(&sql_transaction)?;
    sql_transaction.commit()?;

    tracing::debug!("Recomputed the balances of {count} transactions");

    Ok(())
}

/// Recompute and store every balance without opening a SQL transaction.
///
/// Callers must run this inside their own SQL transaction.
/// Returns the number of transactions that were updated.
pub(crate) fn write_running_balances(connection: &Connection) -> Result<usize, Error> {
    let mut transactions = list_transactions(SortOrder::Ascending, connection)?;
    apply_running_balances(&mut transactions);

    let mut statement = connection
        .prepare("UPDATE \"transaction\" SET remaining_balance = :balance WHERE id = :id")?;

    for transaction in &transactions {
        statement.execute(named_params! {
            ":balance": transaction.remaining_balance,
            ":id": transaction.id,
        })?;
    }

    Ok(transactions.len())
}
