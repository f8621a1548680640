//! The account ledger: the transaction history for a user and the balance derived from it.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    user::{UserID, add_to_balance},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether money came into or went out of the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in, e.g. a salary or a refund.
    Credit,
    /// Money out, e.g. a bill or a purchase.
    Debit,
}

impl TransactionKind {
    /// The kind implied by the sign of `amount`.
    ///
    /// Zero is treated as a debit, but zero amounts are rejected before they
    /// reach the ledger.
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            TransactionKind::Credit
        } else {
            TransactionKind::Debit
        }
    }

    /// The name used when storing or displaying the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "credit" => Ok(TransactionKind::Credit),
            "debit" => Ok(TransactionKind::Debit),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// An event where money either came into or left the user's account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The signed amount, positive for credits and negative for debits.
    pub amount: f64,
    /// Whether this was a credit or a debit, always agrees with the sign of `amount`.
    pub kind: TransactionKind,
    /// Any extra details the user wanted to record.
    pub notes: Option<String>,
}

/// The details needed to append a transaction to a user's ledger.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let salary = NewTransaction::new(3500.0, date!(2025 - 01 - 31), "Salary")
///     .notes("January");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The signed amount of money.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    pub amount: f64,
    /// The date when the transaction occurred, no later than today.
    pub date: Date,
    /// A human-readable description, must not be blank.
    pub description: String,
    /// Optional free text. Blank notes are stored as `None`.
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Start building a transaction with no notes.
    pub fn new(amount: f64, date: Date, description: &str) -> Self {
        Self {
            amount,
            date,
            description: description.to_owned(),
            notes: None,
        }
    }

    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_owned());
        self
    }

    /// Check the transaction can be added to the ledger on `today`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the description is blank, the amount
    /// is zero or not a finite number, or the date is after `today`.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        if self.description.trim().is_empty() {
            return Err(Error::Validation(
                "transaction description must not be empty".to_owned(),
            ));
        }

        if !self.amount.is_finite() || self.amount == 0.0 {
            return Err(Error::Validation(
                "transaction amount must be a non-zero number".to_owned(),
            ));
        }

        if self.date > today {
            return Err(Error::Validation(format!(
                "{} is a date in the future, which is not allowed",
                self.date
            )));
        }

        Ok(())
    }
}

/// A transaction paired with the account balance immediately after it was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    /// The transaction.
    pub transaction: Transaction,
    /// The balance once `transaction` had been applied.
    pub balance_after: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a transaction and apply its amount to the user's balance.
///
/// Takes a database transaction so the new row and the balance change are
/// committed together or not at all. The caller is responsible for committing.
///
/// Returns the user's new balance. Debits may take the balance below zero.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `new_transaction` is invalid (see [NewTransaction::validate]),
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn append_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    today: Date,
    db_transaction: &rusqlite::Transaction,
) -> Result<f64, Error> {
    new_transaction.validate(today)?;

    let kind = TransactionKind::from_amount(new_transaction.amount);
    let notes = new_transaction
        .notes
        .map(|notes| notes.trim().to_owned())
        .filter(|notes| !notes.is_empty());

    // Update the balance first so an unknown user fails before the insert hits the foreign key.
    let new_balance = add_to_balance(user_id, new_transaction.amount, db_transaction)?;

    db_transaction.execute(
        "INSERT INTO \"transaction\" (user_id, date, description, amount, kind, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            new_transaction.date,
            new_transaction.description.trim(),
            new_transaction.amount,
            kind,
            notes,
        ),
    )?;

    tracing::debug!(
        "Appended {kind} of {} for user {user_id}, new balance {new_balance}",
        new_transaction.amount
    );

    Ok(new_balance)
}

/// Retrieve a user's transactions, most recent first.
///
/// "Most recent" means most recently appended, which is the order the
/// amounts were applied to the balance. Pass `None` for `limit` to get every
/// transaction.
///
/// # Errors
/// This function will return a [Error::StorageError] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    limit: Option<usize>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // SQLite treats a negative limit as no limit.
    let limit = limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));

    connection
        .prepare(
            "SELECT id, user_id, date, description, amount, kind, notes FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the number of transactions a user has.
///
/// # Errors
/// This function will return a [Error::StorageError] if there is an SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                notes TEXT,
                CHECK ((kind = 'credit' AND amount > 0) OR (kind = 'debit' AND amount < 0)),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        date: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        kind: row.get(5)?,
        notes: row.get(6)?,
    })
}

// ============================================================================
// RUNNING BALANCES
// ============================================================================

/// Calculates the balance after each transaction by working backwards from the current balance.
///
/// `transactions` must be ordered most recent first, as returned by
/// [list_transactions]. The first entry's balance is `current_balance`, and
/// each following entry's balance is the previous one minus the previous
/// transaction's amount.
pub fn running_balances(current_balance: f64, transactions: Vec<Transaction>) -> Vec<LedgerEntry> {
    let mut running_balance = current_balance;

    transactions
        .into_iter()
        .map(|transaction| {
            let balance_after = running_balance;
            running_balance -= transaction.amount;

            LedgerEntry {
                transaction,
                balance_after,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================



#[cfg(test)]
mod running_balance_tests {
    use time::macros::date;

    use crate::{
        ledger::{Transaction, TransactionKind, running_balances},
        user::UserID,
    };

    fn transaction(id: i64, amount: f64) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            date: date!(2025 - 10 - 05),
            description: format!("#{id}"),
            amount,
            kind: TransactionKind::from_amount(amount),
            notes: None,
        }
    }

    #[test]
    fn reconstructs_balance_after_each_transaction() {
        // Applied in order: 1000 opening, -45, +3500, -200.
        let most_recent_first = vec![
            transaction(3, -200.0),
            transaction(2, 3500.0),
            transaction(1, -45.0),
        ];

        let entries = running_balances(4255.0, most_recent_first);

        let balances: Vec<f64> = entries.iter().map(|entry| entry.balance_after).collect();
        assert_eq!(balances, [4255.0, 4455.0, 955.0]);
    }

    #[test]
    fn empty_history_has_no_entries() {
        assert!(running_balances(100.0, Vec::new()).is_empty());
    }
}
