//! Monthly budgets and the per-category views derived from a user's expenses.
//!
//! A user's stored budget only holds the categories they have changed. The
//! [effective_budget] fills in the rest from [DEFAULT_BUDGET] when it is read.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rusqlite::{Connection, Transaction};
use serde::Serialize;

use crate::{Error, records::Expense, user::UserID};

/// Monthly limits keyed by normalized category name.
pub type Budget = BTreeMap<String, f64>;

/// Total expense cost keyed by normalized category name.
pub type CategoryTotals = BTreeMap<String, f64>;

/// The budget every user starts with.
pub const DEFAULT_BUDGET: [(&str, f64); 10] = [
    ("groceries", 400.0),
    ("rent", 1200.0),
    ("utilities", 200.0),
    ("transportation", 300.0),
    ("entertainment", 150.0),
    ("healthcare", 100.0),
    ("dining out", 200.0),
    ("shopping", 150.0),
    ("subscriptions", 50.0),
    ("other", 100.0),
];

/// The category that small slices are merged into.
pub const OTHER_CATEGORY: &str = "other";

/// Categories with less than this share of the total are merged into [OTHER_CATEGORY].
pub const DEFAULT_SLICE_THRESHOLD: f64 = 0.03;

/// [DEFAULT_BUDGET] as a [Budget].
pub fn default_budget() -> Budget {
    DEFAULT_BUDGET
        .iter()
        .map(|(category, limit)| (category.to_string(), *limit))
        .collect()
}

/// Trim and lower-case a category name so that "Dining Out " and "dining out" match.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Overlay the user's stored limits on the defaults.
///
/// Every default category is present in the result. Categories the user added
/// that are not defaults are kept as-is.
pub fn effective_budget(stored: &Budget) -> Budget {
    let mut budget = default_budget();

    for (category, limit) in stored {
        budget.insert(category.clone(), *limit);
    }

    budget
}

/// Sum expense costs by normalized category.
///
/// Expenses whose category is blank after normalizing are skipped.
pub fn aggregate_by_category(expenses: &[Expense]) -> CategoryTotals {
    let mut totals = CategoryTotals::new();

    for expense in expenses {
        let category = normalize_category(&expense.category);

        if category.is_empty() {
            continue;
        }

        *totals.entry(category).or_insert(0.0) += expense.cost;
    }

    totals
}

/// Merge the categories whose share of the grand total is below `threshold_ratio` into [OTHER_CATEGORY].
///
/// The merged amount is added to any existing [OTHER_CATEGORY] total. If the
/// grand total is zero the totals are returned unchanged.
pub fn collapse_small_slices(totals: &CategoryTotals, threshold_ratio: f64) -> CategoryTotals {
    let grand_total: f64 = totals.values().sum();

    if grand_total == 0.0 {
        return totals.clone();
    }

    let mut collapsed = CategoryTotals::new();
    let mut other_total = 0.0;

    for (category, amount) in totals {
        if amount / grand_total >= threshold_ratio {
            collapsed.insert(category.clone(), *amount);
        } else {
            other_total += amount;
        }
    }

    if other_total > 0.0 {
        *collapsed.entry(OTHER_CATEGORY.to_owned()).or_insert(0.0) += other_total;
    }

    collapsed
}

/// How the spending in one category compares to its budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetComparison {
    /// The normalized category name.
    pub category: String,
    /// The monthly limit, zero if the category has no budget.
    pub budgeted: f64,
    /// The total cost of the expenses in the category.
    pub actual: f64,
    /// `actual - budgeted`, positive when over budget.
    pub delta: f64,
}

/// Compare an effective budget against actual spending for every category in either.
///
/// Rows are sorted by category name.
pub fn budget_vs_actual(effective: &Budget, actual: &CategoryTotals) -> Vec<BudgetComparison> {
    let categories: BTreeSet<&String> =
        effective.keys().chain(actual.keys()).collect();

    categories
        .into_iter()
        .map(|category| {
            let budgeted = effective.get(category).copied().unwrap_or(0.0);
            let actual = actual.get(category).copied().unwrap_or(0.0);

            BudgetComparison {
                category: category.clone(),
                budgeted,
                actual,
                delta: actual - budgeted,
            }
        })
        .collect()
}

/// Normalize the keys of `budget` and check every limit.
///
/// # Errors
/// Returns an [Error::Validation] if a key is blank, two keys normalize to the
/// same category, or a limit is negative or not finite.
fn validate_budget(budget: &Budget) -> Result<Budget, Error> {
    let mut seen = HashSet::new();
    let mut normalized = Budget::new();

    for (category, limit) in budget {
        let key = normalize_category(category);

        if key.is_empty() {
            return Err(Error::Validation(
                "budget category must not be empty".to_owned(),
            ));
        }

        if !seen.insert(key.clone()) {
            return Err(Error::Validation(format!(
                "budget category \"{key}\" was given more than once"
            )));
        }

        if !limit.is_finite() || *limit < 0.0 {
            return Err(Error::Validation(format!(
                "budget for \"{key}\" must be zero or more"
            )));
        }

        normalized.insert(key, *limit);
    }

    Ok(normalized)
}

/// Get the limits the user has set, without the defaults.
pub fn get_stored_budget(user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare("SELECT category, monthly_limit FROM budget WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Replace the user's stored budget with `budget`.
///
/// The caller commits `transaction`. Nothing is written if validation fails.
///
/// # Errors
/// Returns an [Error::Validation] if `budget` is invalid, or an
/// [Error::NotFound] if the user does not exist.
pub fn update_budget(
    user_id: UserID,
    budget: &Budget,
    transaction: &Transaction,
) -> Result<(), Error> {
    let budget = validate_budget(budget)?;

    let user_exists: bool = transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    if !user_exists {
        return Err(Error::NotFound);
    }

    transaction.execute("DELETE FROM budget WHERE user_id = ?1", [user_id.as_i64()])?;

    let mut statement = transaction
        .prepare("INSERT INTO budget (user_id, category, monthly_limit) VALUES (?1, ?2, ?3)")?;

    for (category, limit) in &budget {
        statement.execute((user_id.as_i64(), category, limit))?;
    }

    tracing::debug!(
        "replaced budget for user {user_id} with {} categories",
        budget.len()
    );

    Ok(())
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            monthly_limit REAL NOT NULL CHECK (monthly_limit >= 0),
            PRIMARY KEY(user_id, category),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod aggregation_tests {
    use crate::{
        budget::{
            Budget, CategoryTotals, DEFAULT_SLICE_THRESHOLD, aggregate_by_category,
            budget_vs_actual, collapse_small_slices, default_budget, effective_budget,
            normalize_category,
        },
        records::Expense,
    };

    fn budget(entries: &[(&str, f64)]) -> Budget {
        entries
            .iter()
            .map(|(category, amount)| (category.to_string(), *amount))
            .collect()
    }

    fn expense(category: &str, cost: f64) -> Expense {
        Expense {
            id: 0,
            name: "test".to_owned(),
            category: category.to_owned(),
            cost,
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_category("  Dining Out\t"), "dining out");
    }

    #[test]
    fn effective_budget_contains_all_defaults() {
        let got = effective_budget(&Budget::new());

        assert_eq!(got, default_budget());
        assert_eq!(got.len(), 10);
        assert_eq!(got["dining out"], 200.0);
    }

    #[test]
    fn effective_budget_overrides_and_extends_defaults() {
        let stored = budget(&[("rent", 1500.0), ("pets", 80.0)]);

        let got = effective_budget(&stored);

        assert_eq!(got.len(), 11);
        assert_eq!(got["rent"], 1500.0);
        assert_eq!(got["pets"], 80.0);
        assert_eq!(got["groceries"], 400.0);
    }

    #[test]
    fn aggregate_groups_by_normalized_category() {
        let expenses = [
            expense("Dining Out", 10.0),
            expense(" dining out ", 5.5),
            expense("Rent", 1200.0),
            expense("   ", 99.0),
        ];

        let got = aggregate_by_category(&expenses);

        assert_eq!(got, budget(&[("dining out", 15.5), ("rent", 1200.0)]));
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        assert_eq!(aggregate_by_category(&[]), CategoryTotals::new());
    }

    #[test]
    fn collapse_merges_small_slices_into_other() {
        let totals = budget(&[("a", 1.0), ("b", 98.0), ("c", 1.0)]);

        let got = collapse_small_slices(&totals, DEFAULT_SLICE_THRESHOLD);

        assert_eq!(got, budget(&[("b", 98.0), ("other", 2.0)]));
    }

    #[test]
    fn collapse_adds_to_existing_other() {
        let totals = budget(&[("a", 1.0), ("b", 89.0), ("other", 10.0)]);

        let got = collapse_small_slices(&totals, DEFAULT_SLICE_THRESHOLD);

        assert_eq!(got, budget(&[("b", 89.0), ("other", 11.0)]));
    }

    #[test]
    fn collapse_keeps_slices_at_threshold() {
        let totals = budget(&[("a", 3.0), ("b", 97.0)]);

        let got = collapse_small_slices(&totals, DEFAULT_SLICE_THRESHOLD);

        assert_eq!(got, totals);
    }

    #[test]
    fn collapse_empty_returns_empty() {
        assert_eq!(
            collapse_small_slices(&CategoryTotals::new(), DEFAULT_SLICE_THRESHOLD),
            CategoryTotals::new()
        );
    }

    #[test]
    fn collapse_zero_total_returns_input() {
        let totals = budget(&[("a", 0.0), ("b", 0.0)]);

        assert_eq!(collapse_small_slices(&totals, DEFAULT_SLICE_THRESHOLD), totals);
    }

    #[test]
    fn budget_vs_actual_covers_both_sides() {
        let effective = budget(&[("groceries", 400.0), ("rent", 1200.0)]);
        let actual = budget(&[("groceries", 450.0), ("pets", 30.0)]);

        let got = budget_vs_actual(&effective, &actual);

        let rows: Vec<(&str, f64, f64, f64)> = got
            .iter()
            .map(|row| (row.category.as_str(), row.budgeted, row.actual, row.delta))
            .collect();
        assert_eq!(
            rows,
            [
                ("groceries", 400.0, 450.0, 50.0),
                ("pets", 0.0, 30.0, 30.0),
                ("rent", 1200.0, 0.0, -1200.0),
            ]
        );
    }
}
