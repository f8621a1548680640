//! Expenses, debts and investments: the category records a user keeps alongside their ledger.
//!
//! Each record type has the same set of operations (create, get, list,
//! update, delete) scoped to a single user. Only expenses enforce uniqueness.

mod debt;
mod expense;
mod investment;

pub use debt::{
    Debt, DebtId, NewDebt, create_debt, create_debt_table, delete_debt, get_debt, get_debts,
    total_debt, update_debt,
};
pub use expense::{
    Expense, ExpenseId, NewExpense, create_expense, create_expense_table, delete_expense,
    get_expense, get_expenses, total_expense_cost, update_expense,
};
pub use investment::{
    Investment, InvestmentId, NewInvestment, create_investment, create_investment_table,
    delete_investment, get_investment, get_investments, total_investments, update_investment,
};

use crate::{Error, is_foreign_key_violation};

/// Trim `value` and check it is not empty.
fn require_text(field: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        Err(Error::Validation(format!("{field} must not be empty")))
    } else {
        Ok(value.to_owned())
    }
}

/// Check that `value` is a finite number greater than zero.
fn require_positive(field: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{field} must be greater than zero"
        )))
    }
}

/// Check that `value` is a finite number that is zero or more.
fn require_non_negative(field: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!("{field} must be zero or more")))
    }
}

/// Map an error from inserting a record, where a foreign key failure means the user does not exist.
fn map_insert_error(error: rusqlite::Error) -> Error {
    if is_foreign_key_violation(&error) {
        Error::NotFound
    } else {
        error.into()
    }
}
