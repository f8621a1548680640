//! A summary of a user's finances.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    budget::{effective_budget, get_stored_budget},
    ledger::count_transactions,
    records::{total_debt, total_expense_cost, total_investments},
    user::{UserID, get_user_by_id},
};

/// Totals across the ledger, the category records and the budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// The current account balance.
    pub balance: f64,
    /// How many transactions are in the ledger.
    pub transaction_count: usize,
    /// The sum of all expense costs.
    pub total_expenses: f64,
    /// The sum of the amount owed on all debts.
    pub total_debt_owed: f64,
    /// The sum of the monthly payments on all debts.
    pub total_monthly_debt_payments: f64,
    /// The sum of all investments.
    pub total_investments: f64,
    /// The sum of the effective monthly budget.
    pub total_budget: f64,
    /// Expenses as a percentage of the goal budget, capped at 100.
    ///
    /// `None` when the user has not set a goal budget.
    pub goal_progress: Option<f64>,
}

/// Expenses as a percentage of `goal_budget`, capped at 100.
///
/// Returns `None` if `goal_budget` is not positive.
pub(crate) fn goal_progress(total_expenses: f64, goal_budget: f64) -> Option<f64> {
    if goal_budget > 0.0 {
        Some((total_expenses / goal_budget * 100.0).min(100.0))
    } else {
        None
    }
}

/// Build the summary for a user.
///
/// # Errors
/// Returns an [Error::NotFound] if the user does not exist, or an
/// [Error::StorageError] if there is an SQL error.
pub(crate) fn build_summary(
    user_id: UserID,
    connection: &Connection,
) -> Result<FinancialSummary, Error> {
    let user = get_user_by_id(user_id, connection)?;
    let total_expenses = total_expense_cost(user_id, connection)?;
    let (total_debt_owed, total_monthly_debt_payments) = total_debt(user_id, connection)?;
    let total_budget: f64 = effective_budget(&get_stored_budget(user_id, connection)?)
        .values()
        .sum();

    Ok(FinancialSummary {
        balance: user.balance,
        transaction_count: count_transactions(user_id, connection)?,
        total_expenses,
        total_debt_owed,
        total_monthly_debt_payments,
        total_investments: total_investments(user_id, connection)?,
        total_budget,
        goal_progress: goal_progress(total_expenses, user.profile.goal_budget),
    })
}
