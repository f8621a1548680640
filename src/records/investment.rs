use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    records::{map_insert_error, require_positive, require_text},
    user::UserID,
};

/// Database identifier for an investment.
pub type InvestmentId = i64;

/// Money the user has put into an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// The ID of the investment.
    pub id: InvestmentId,
    /// The name of the investment, e.g. "Index fund".
    pub name: String,
    /// The amount invested.
    pub amount: f64,
    /// A free-form label such as "low" or "high", may be empty.
    pub risk_level: String,
}

/// The fields used to create or replace an investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvestment {
    /// The name of the investment, must not be blank.
    pub name: String,
    /// The amount invested, must be greater than zero.
    pub amount: f64,
    /// The risk label.
    pub risk_level: String,
}

impl NewInvestment {
    /// Create a new investment.
    pub fn new(name: &str, amount: f64, risk_level: &str) -> Self {
        Self {
            name: name.to_owned(),
            amount,
            risk_level: risk_level.to_owned(),
        }
    }

    fn validate(self) -> Result<Self, Error> {
        let name = require_text("investment name", &self.name)?;
        require_positive("investment amount", self.amount)?;

        Ok(Self {
            name,
            amount: self.amount,
            risk_level: self.risk_level.trim().to_owned(),
        })
    }
}

/// Create an investment for a user.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the name is blank or the amount is not positive,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn create_investment(
    user_id: UserID,
    investment: NewInvestment,
    connection: &Connection,
) -> Result<Investment, Error> {
    let investment = investment.validate()?;

    connection
        .prepare(
            "INSERT INTO investment (user_id, name, amount, risk_level)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, amount, risk_level",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &investment.name,
                investment.amount,
                &investment.risk_level,
            ),
            map_investment_row,
        )
        .map_err(map_insert_error)
}

/// Retrieve a single investment belonging to `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the investment does not exist or belongs to another user.
pub fn get_investment(
    user_id: UserID,
    investment_id: InvestmentId,
    connection: &Connection,
) -> Result<Investment, Error> {
    connection
        .prepare(
            "SELECT id, name, amount, risk_level FROM investment WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((investment_id, user_id.as_i64()), map_investment_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's investments in the order they were created.
pub fn get_investments(user_id: UserID, connection: &Connection) -> Result<Vec<Investment>, Error> {
    connection
        .prepare(
            "SELECT id, name, amount, risk_level FROM investment WHERE user_id = ?1 ORDER BY id ASC",
        )?
        .query_map([user_id.as_i64()], map_investment_row)?
        .map(|maybe_investment| maybe_investment.map_err(|error| error.into()))
        .collect()
}

/// Replace the fields of an existing investment.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the name is blank or the amount is not positive,
/// - [Error::NotFound] if the investment does not exist or belongs to another user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn update_investment(
    user_id: UserID,
    investment_id: InvestmentId,
    investment: NewInvestment,
    connection: &Connection,
) -> Result<(), Error> {
    let investment = investment.validate()?;

    let rows_affected = connection.execute(
        "UPDATE investment SET name = ?1, amount = ?2, risk_level = ?3
         WHERE id = ?4 AND user_id = ?5",
        (
            &investment.name,
            investment.amount,
            &investment.risk_level,
            investment_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Permanently delete an investment.
///
/// # Errors
/// Returns an [Error::NotFound] if the investment does not exist or belongs to another user.
pub fn delete_investment(
    user_id: UserID,
    investment_id: InvestmentId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM investment WHERE id = ?1 AND user_id = ?2",
        (investment_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The total amount invested across all of a user's investments.
pub fn total_investments(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM investment WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Initialize the investment table.
pub fn create_investment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS investment (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            risk_level TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_investment_user_id ON investment(user_id);",
    )?;

    Ok(())
}

fn map_investment_row(row: &Row) -> Result<Investment, rusqlite::Error> {
    Ok(Investment {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        risk_level: row.get(3)?,
    })
}
