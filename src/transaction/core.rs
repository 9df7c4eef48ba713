//! Defines the core data models and database queries for transactions.

use std::collections::BTreeSet;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::{
    Error,
    amount::Amount,
    balance::{append_balance, current_balance, write_running_balances},
    database_id::TransactionId,
    error::ValidationError,
};

// ============================================================================
// MODELS
// ============================================================================

/// The most characters a transaction name may have.
pub const MAX_NAME_LENGTH: usize = 100;

/// A single ledger entry where money was received, paid, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction. IDs increase with insertion order.
    pub id: TransactionId,
    /// Who or what the transaction was with.
    pub name: String,
    /// An optional free text note.
    pub comment: Option<String>,
    /// The money that came in.
    pub amount_received: Amount,
    /// The money that went out.
    pub amount_paid: Amount,
    /// The balance of the ledger right after this transaction.
    pub remaining_balance: Amount,
    /// The local date when the transaction was recorded.
    pub date: Date,
    /// The local time of day when the transaction was recorded.
    pub time: Time,
    /// The instant the transaction was recorded, stored as UTC.
    pub created_at: OffsetDateTime,
}

/// Validated user input for a new transaction.
///
/// To create a `NewTransaction`, use [NewTransaction::new].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    name: String,
    comment: Option<String>,
    amount_received: Amount,
    amount_paid: Amount,
}

impl NewTransaction {
    /// Validate the user input for a new transaction.
    ///
    /// `name` and `comment` are trimmed, and a blank comment is treated as no
    /// comment. A missing amount is treated as zero.
    ///
    /// # Errors
    /// Returns a:
    /// - [ValidationError::EmptyName] if `name` is blank,
    /// - [ValidationError::NameTooLong] if `name` has more than [MAX_NAME_LENGTH] characters,
    /// - [ValidationError::MissingAmount] if both amounts are zero or missing,
    /// - or the error from [Amount::from_decimal] if an amount is invalid.
    pub fn new(
        name: &str,
        comment: Option<&str>,
        amount_received: Option<Decimal>,
        amount_paid: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::NameTooLong(MAX_NAME_LENGTH));
        }

        let amount_received = amount_received
            .map(Amount::from_decimal)
            .transpose()?
            .unwrap_or_default();
        let amount_paid = amount_paid
            .map(Amount::from_decimal)
            .transpose()?
            .unwrap_or_default();

        if amount_received.is_zero() && amount_paid.is_zero() {
            return Err(ValidationError::MissingAmount);
        }

        let comment = comment
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_owned);

        Ok(Self {
            name: name.to_owned(),
            comment,
            amount_received,
            amount_paid,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn amount_received(&self) -> Amount {
        self.amount_received
    }

    pub fn amount_paid(&self) -> Amount {
        self.amount_paid
    }
}

/// The order to sort transactions in by ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, name, comment, amount_received, amount_paid, \
    remaining_balance, date, time, created_at";

/// Record a new transaction at `local_now`.
///
/// The remaining balance of the new transaction is the balance of the latest
/// transaction plus the amount received minus the amount paid. Reading the
/// latest balance and inserting the new row happen in one SQL transaction.
///
/// The date and time are taken from `local_now` as is, the creation instant
/// is stored as UTC.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    local_now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let sql_transaction = connection.unchecked_transaction()?;

    let previous_balance = current_balance(&sql_transaction)?;
    let remaining_balance = append_balance(
        previous_balance,
        new_transaction.amount_received,
        new_transaction.amount_paid,
    );

    let local_now = local_now.replace_nanosecond(0).unwrap_or(local_now);

    let transaction = sql_transaction
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (name, comment, amount_received, amount_paid, remaining_balance, date, time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_transaction.name,
                new_transaction.comment,
                new_transaction.amount_received,
                new_transaction.amount_paid,
                remaining_balance,
                local_now.date(),
                local_now.time(),
                local_now.to_offset(UtcOffset::UTC),
            ),
            map_transaction_row,
        )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get every transaction sorted by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_transactions(
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let order = match sort_order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY id {order}"
        ))?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Delete the transaction `id` and recompute the balance of every remaining
/// transaction.
///
/// The delete and the recomputation happen in one SQL transaction, so the
/// ledger is never left with stale balances.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let sql_transaction = connection.unchecked_transaction()?;

    let rows_affected = sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    write_running_balances(&sql_transaction)?;
    sql_transaction.commit()?;

    Ok(())
}

/// Get the distinct dates that have at least one transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn distinct_dates(connection: &Connection) -> Result<BTreeSet<Date>, Error> {
    connection
        .prepare("SELECT DISTINCT date FROM \"transaction\"")?
        .query_map([], |row| row.get::<_, Date>(0))?
        .map(|date_result| date_result.map_err(Error::from))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                comment TEXT,
                amount_received INTEGER NOT NULL DEFAULT 0,
                amount_paid INTEGER NOT NULL DEFAULT 0,
                remaining_balance INTEGER NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
            SELECT 'transaction', 0
            WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transaction')",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        name: row.get(1)?,
        comment: row.get(2)?,
        amount_received: row.get(3)?,
        amount_paid: row.get(4)?,
        remaining_balance: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        created_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::{
        UtcOffset,
        macros::{date, datetime, time},
    };

    use crate::{
        Error,
        amount::Amount,
        db::initialize,
        transaction::{
            NewTransaction, SortOrder, count_transactions, create_transaction, delete_transaction,
            distinct_dates, get_transaction, list_transactions,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(name: &str, received: &str, paid: &str) -> NewTransaction {
        NewTransaction::new(
            name,
            None,
            Some(Decimal::from_str(received).unwrap()),
            Some(Decimal::from_str(paid).unwrap()),
        )
        .unwrap()
    }

    fn balances(conn: &Connection) -> Vec<Amount> {
        list_transactions(SortOrder::Ascending, conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.remaining_balance)
            .collect()
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:15.123 +5);

        let transaction =
            create_transaction(new_transaction("Alice", "100", "0"), now, &conn).unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.name, "Alice");
        assert_eq!(transaction.amount_received, Amount::from_cents(10_000));
        assert_eq!(transaction.remaining_balance, Amount::from_cents(10_000));
        assert_eq!(transaction.date, date!(2025 - 08 - 25));
        assert_eq!(transaction.time, time!(14:30:15));
        assert_eq!(transaction.created_at, datetime!(2025-08-25 09:30:15 UTC));
        assert_eq!(transaction.created_at.offset(), UtcOffset::UTC);
    }

    #[test]
    fn create_uses_local_date() {
        let conn = get_test_connection();
        // Still the 24th in UTC.
        let now = datetime!(2025-08-25 02:00:00 +5);

        let transaction =
            create_transaction(new_transaction("Alice", "1", "0"), now, &conn).unwrap();

        assert_eq!(transaction.date, date!(2025 - 08 - 25));
        assert_eq!(transaction.created_at.date(), date!(2025 - 08 - 24));
    }

    #[test]
    fn create_chains_balances() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);

        create_transaction(new_transaction("A", "100", "0"), now, &conn).unwrap();
        create_transaction(new_transaction("B", "0", "30"), now, &conn).unwrap();
        let last = create_transaction(new_transaction("C", "10", "0"), now, &conn).unwrap();

        assert_eq!(last.remaining_balance, Amount::from_cents(8_000));
        assert_eq!(
            balances(&conn),
            vec![
                Amount::from_cents(10_000),
                Amount::from_cents(7_000),
                Amount::from_cents(8_000)
            ]
        );
    }

    #[test]
    fn balance_can_go_negative() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);

        let transaction =
            create_transaction(new_transaction("Rent", "0", "500"), now, &conn).unwrap();

        assert_eq!(transaction.remaining_balance, Amount::from_cents(-50_000));
    }

    #[test]
    fn get_transaction_round_trips() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        let new = NewTransaction::new("Alice", Some("lunch"), None, Some(Decimal::new(1250, 2)))
            .unwrap();
        let created = create_transaction(new, now, &conn).unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(got, created);
        assert_eq!(got.comment.as_deref(), Some("lunch"));
    }

    #[test]
    fn get_missing_transaction_fails() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_transactions_sorts_by_id() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        for name in ["A", "B", "C"] {
            create_transaction(new_transaction(name, "1", "0"), now, &conn).unwrap();
        }

        let ascending: Vec<i64> = list_transactions(SortOrder::Ascending, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        let descending: Vec<i64> = list_transactions(SortOrder::Descending, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ascending, vec![1, 2, 3]);
        assert_eq!(descending, vec![3, 2, 1]);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let now = datetime!(2025-10-05 12:00:00 +5);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(new_transaction("Test", &i.to_string(), "0"), now, &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn delete_recomputes_later_balances() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        create_transaction(new_transaction("A", "100", "0"), now, &conn).unwrap();
        let middle = create_transaction(new_transaction("B", "0", "30"), now, &conn).unwrap();
        create_transaction(new_transaction("C", "10", "0"), now, &conn).unwrap();

        delete_transaction(middle.id, &conn).unwrap();

        assert_eq!(get_transaction(middle.id, &conn), Err(Error::NotFound));
        assert_eq!(
            balances(&conn),
            vec![Amount::from_cents(10_000), Amount::from_cents(11_000)]
        );
    }

    #[test]
    fn delete_first_transaction_rebases_ledger() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        let first = create_transaction(new_transaction("A", "100", "0"), now, &conn).unwrap();
        create_transaction(new_transaction("B", "0", "30"), now, &conn).unwrap();

        delete_transaction(first.id, &conn).unwrap();

        assert_eq!(balances(&conn), vec![Amount::from_cents(-3_000)]);
    }

    #[test]
    fn delete_last_transaction_empties_ledger() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        let only = create_transaction(new_transaction("A", "100", "0"), now, &conn).unwrap();

        delete_transaction(only.id, &conn).unwrap();

        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn delete_missing_transaction_changes_nothing() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        create_transaction(new_transaction("A", "100", "0"), now, &conn).unwrap();
        create_transaction(new_transaction("B", "0", "30"), now, &conn).unwrap();
        let before = balances(&conn);

        let result = delete_transaction(999, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(balances(&conn), before);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = get_test_connection();
        let now = datetime!(2025-08-25 14:30:00 +5);
        create_transaction(new_transaction("A", "1", "0"), now, &conn).unwrap();
        let last = create_transaction(new_transaction("B", "1", "0"), now, &conn).unwrap();
        delete_transaction(last.id, &conn).unwrap();

        let next = create_transaction(new_transaction("C", "1", "0"), now, &conn).unwrap();

        assert_eq!(next.id, 3);
        assert_eq!(next.remaining_balance, Amount::from_cents(200));
    }

    #[test]
    fn distinct_dates_are_sorted_and_unique() {
        let conn = get_test_connection();
        for now in [
            datetime!(2025-09-01 10:00:00 +5),
            datetime!(2025-08-25 10:00:00 +5),
            datetime!(2025-09-01 11:00:00 +5),
        ] {
            create_transaction(new_transaction("A", "1", "0"), now, &conn).unwrap();
        }

        let dates: Vec<_> = distinct_dates(&conn).unwrap().into_iter().collect();

        assert_eq!(dates, vec![date!(2025 - 08 - 25), date!(2025 - 09 - 01)]);
    }
}
