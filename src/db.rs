//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    budget::create_budget_table,
    ledger::create_transaction_table,
    records::{create_debt_table, create_expense_table, create_investment_table},
    user::create_user_table,
};

/// Create the tables for all of the domain models.
///
/// Foreign key enforcement is switched on for `connection` so that records
/// cannot reference users that do not exist.
///
/// # Errors
/// Returns an error if any of the tables could not be created, in which case
/// none of them are.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_investment_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
