//! Loans and other debts the user is paying off.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    records::{map_insert_error, require_non_negative, require_positive, require_text},
    user::UserID,
};

/// Database identifier for a debt.
pub type DebtId = i64;

/// Money the user owes, and what they pay towards it each month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// The ID of the debt.
    pub id: DebtId,
    /// The name of the debt, e.g. "Car loan".
    pub name: String,
    /// The amount still owed.
    pub amount_owed: f64,
    /// The annual interest rate as a percentage.
    pub interest_rate: f64,
    /// The amount paid each month.
    pub monthly_payment: f64,
}

/// The fields used to create or replace a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebt {
    /// The name of the debt, must not be blank.
    pub name: String,
    /// The amount owed, must be greater than zero.
    pub amount_owed: f64,
    /// The interest rate, must be zero or more.
    pub interest_rate: f64,
    /// The monthly payment, must be greater than zero.
    pub monthly_payment: f64,
}

impl NewDebt {
    /// Create a new debt.
    pub fn new(name: &str, amount_owed: f64, interest_rate: f64, monthly_payment: f64) -> Self {
        Self {
            name: name.to_owned(),
            amount_owed,
            interest_rate,
            monthly_payment,
        }
    }

    fn validate(self) -> Result<Self, Error> {
        let name = require_text("debt name", &self.name)?;
        require_positive("amount owed", self.amount_owed)?;
        require_non_negative("interest rate", self.interest_rate)?;
        require_positive("monthly payment", self.monthly_payment)?;

        Ok(Self { name, ..self })
    }
}

/// Create a debt for a user.
///
/// Debts are not unique, the same name may be used any number of times.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is blank or out of range,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn create_debt(user_id: UserID, debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    let debt = debt.validate()?;

    connection
        .prepare(
            "INSERT INTO debt (user_id, name, amount_owed, interest_rate, monthly_payment)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, amount_owed, interest_rate, monthly_payment",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &debt.name,
                debt.amount_owed,
                debt.interest_rate,
                debt.monthly_payment,
            ),
            map_debt_row,
        )
        .map_err(map_insert_error)
}

/// Retrieve a single debt belonging to `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the debt does not exist or belongs to another user.
pub fn get_debt(user_id: UserID, debt_id: DebtId, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(
            "SELECT id, name, amount_owed, interest_rate, monthly_payment
             FROM debt WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((debt_id, user_id.as_i64()), map_debt_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's debts in the order they were created.
pub fn get_debts(user_id: UserID, connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(
            "SELECT id, name, amount_owed, interest_rate, monthly_payment
             FROM debt WHERE user_id = ?1 ORDER BY id ASC",
        )?
        .query_map([user_id.as_i64()], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Replace the fields of an existing debt.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is blank or out of range,
/// - [Error::NotFound] if the debt does not exist or belongs to another user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn update_debt(
    user_id: UserID,
    debt_id: DebtId,
    debt: NewDebt,
    connection: &Connection,
) -> Result<(), Error> {
    let debt = debt.validate()?;

    let rows_affected = connection.execute(
        "UPDATE debt SET name = ?1, amount_owed = ?2, interest_rate = ?3, monthly_payment = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            &debt.name,
            debt.amount_owed,
            debt.interest_rate,
            debt.monthly_payment,
            debt_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Permanently delete a debt.
///
/// # Errors
/// Returns an [Error::NotFound] if the debt does not exist or belongs to another user.
pub fn delete_debt(user_id: UserID, debt_id: DebtId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM debt WHERE id = ?1 AND user_id = ?2",
        (debt_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The total amount owed and the total monthly payment across all of a user's debts.
pub fn total_debt(user_id: UserID, connection: &Connection) -> Result<(f64, f64), Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount_owed), 0), COALESCE(SUM(monthly_payment), 0)
             FROM debt WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|error| error.into())
}

/// Initialize the debt table.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount_owed REAL NOT NULL CHECK (amount_owed > 0),
            interest_rate REAL NOT NULL CHECK (interest_rate >= 0),
            monthly_payment REAL NOT NULL CHECK (monthly_payment > 0),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_debt_user_id ON debt(user_id);",
    )?;

    Ok(())
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        name: row.get(1)?,
        amount_owed: row.get(2)?,
        interest_rate: row.get(3)?,
        monthly_payment: row.get(4)?,
    })
}
