//! A personal finance record-keeper.
//!
//! Users register and log in, then keep a ledger of transactions alongside
//! their expenses, debts, investments and a per-category monthly budget.
//! Everything is stored in a SQLite database and accessed through a
//! [Directory], which hands out an explicit [Session] for each logged-in user.

#![warn(missing_docs)]

mod budget;
mod clock;
mod config;
mod credentials;
mod db;
mod directory;
mod ledger;
mod password;
mod records;
mod report;
mod user;

#[cfg(test)]
mod test_utils;

pub use budget::{
    Budget, BudgetComparison, CategoryTotals, DEFAULT_BUDGET, DEFAULT_SLICE_THRESHOLD,
    OTHER_CATEGORY, aggregate_by_category, budget_vs_actual, collapse_small_slices,
    default_budget, effective_budget, normalize_category,
};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::Config;
pub use credentials::UserIdentity;
pub use db::initialize as initialize_db;
pub use directory::{Directory, Session};
pub use ledger::{
    LedgerEntry, NewTransaction, Transaction, TransactionId, TransactionKind, running_balances,
};
pub use password::{PasswordHash, ValidatedPassword};
pub use records::{
    Debt, DebtId, Expense, ExpenseId, Investment, InvestmentId, NewDebt, NewExpense,
    NewInvestment,
};
pub use report::FinancialSummary;
pub use user::{PayRate, User, UserID, UserProfile};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller supplied missing, malformed or out-of-range input.
    ///
    /// The string describes which field was rejected and why, and is safe to
    /// show to the user so they can correct their input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The email used to register is already in use.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// A record with the same identifying fields already exists.
    ///
    /// Only expenses are unique, by their case-insensitive name and category.
    #[error("{0} already exists")]
    DuplicateRecord(String),

    /// The requested resource was not found.
    ///
    /// This covers unknown emails at log-in and record IDs that do not belong
    /// to the user making the request.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The password did not match the stored password hash.
    #[error("invalid password")]
    InvalidCredentials,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The database failed in a way the caller cannot recover from.
    ///
    /// The underlying error is logged where it is converted, callers only see
    /// this generic failure.
    #[error("an unexpected storage error occurred")]
    StorageError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StorageError
            }
        }
    }
}

/// Returns `true` if `error` was caused by a UNIQUE constraint failing.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )
    )
}

/// Returns `true` if `error` was caused by a FOREIGN KEY constraint failing.
pub(crate) fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        )
    )
}

#[cfg(test)]
mod error_tests {
    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn other_sql_errors_hide_details() {
        let error: Error = rusqlite::Error::InvalidQuery.into();

        assert_eq!(error, Error::StorageError);
        assert_eq!(error.to_string(), "an unexpected storage error occurred");
    }
}
