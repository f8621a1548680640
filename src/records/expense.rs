//! Recurring expenses grouped by budget category.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    budget::normalize_category,
    is_unique_violation,
    records::{map_insert_error, require_positive, require_text},
    user::UserID,
};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Something the user regularly spends money on, e.g. "Coffee" in "dining out".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The name of the expense.
    pub name: String,
    /// The budget category the expense counts towards.
    pub category: String,
    /// How much the expense costs.
    pub cost: f64,
}

/// The fields used to create or replace an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// The name of the expense, must not be blank.
    pub name: String,
    /// The budget category, must not be blank.
    pub category: String,
    /// The cost, must be greater than zero.
    pub cost: f64,
}

impl NewExpense {
    /// Create a new expense.
    pub fn new(name: &str, category: &str, cost: f64) -> Self {
        Self {
            name: name.to_owned(),
            category: category.to_owned(),
            cost,
        }
    }

    /// Trim the text fields and check all fields are valid.
    fn validate(self) -> Result<Self, Error> {
        let name = require_text("expense name", &self.name)?;
        let category = require_text("expense category", &self.category)?;
        require_positive("expense cost", self.cost)?;

        Ok(Self {
            name,
            category,
            cost: self.cost,
        })
    }

    fn duplicate_error(&self) -> Error {
        Error::DuplicateRecord(format!(
            "an expense named \"{}\" in the category \"{}\"",
            self.name, self.category
        ))
    }
}

/// Case-insensitive key used to detect duplicate expense names.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Create an expense for a user.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is blank or the cost is not positive,
/// - [Error::DuplicateRecord] if the user already has an expense with the same
///   name and category, ignoring case and surrounding whitespace,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn create_expense(
    user_id: UserID,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = expense.validate()?;

    connection
        .prepare(
            "INSERT INTO expense (user_id, name, category, cost, name_key, category_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, name, category, cost",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &expense.name,
                &expense.category,
                expense.cost,
                name_key(&expense.name),
                normalize_category(&expense.category),
            ),
            map_expense_row,
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                expense.duplicate_error()
            } else {
                map_insert_error(error)
            }
        })
}

/// Retrieve a single expense belonging to `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the expense does not exist or belongs to another user.
pub fn get_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, name, category, cost FROM expense WHERE id = ?1 AND user_id = ?2")?
        .query_row((expense_id, user_id.as_i64()), map_expense_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's expenses in the order they were created.
///
/// # Errors
/// Returns an [Error::StorageError] if there is an SQL error.
pub fn get_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare("SELECT id, name, category, cost FROM expense WHERE user_id = ?1 ORDER BY id ASC")?
        .query_map([user_id.as_i64()], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace the fields of an existing expense.
///
/// The duplicate check ignores the expense being updated, so an expense can
/// be saved with a different cost or a change in letter case.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is blank or the cost is not positive,
/// - [Error::NotFound] if the expense does not exist or belongs to another user,
/// - [Error::DuplicateRecord] if another of the user's expenses has the same name and category,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn update_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    expense: NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    let expense = expense.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE expense SET name = ?1, category = ?2, cost = ?3, name_key = ?4, category_key = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                &expense.name,
                &expense.category,
                expense.cost,
                name_key(&expense.name),
                normalize_category(&expense.category),
                expense_id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                expense.duplicate_error()
            } else {
                error.into()
            }
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Permanently delete an expense.
///
/// # Errors
/// Returns an [Error::NotFound] if the expense does not exist or belongs to another user.
pub fn delete_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The sum of the cost of all of a user's expenses.
///
/// # Errors
/// Returns an [Error::StorageError] if there is an SQL error.
pub fn total_expense_cost(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(cost), 0) FROM expense WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Initialize the expense table and indexes.
///
/// The unique index over the normalized name and category is what prevents
/// duplicate expenses, which keeps the check and the write in one statement.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            cost REAL NOT NULL CHECK (cost > 0),
            name_key TEXT NOT NULL,
            category_key TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_expense_unique_name
            ON expense(user_id, name_key, category_key);",
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        cost: row.get(3)?,
    })
}
