//! The entry point for callers: owns the database and hands out sessions.
//!
//! Every user-scoped operation takes the [Session] returned by
//! [Directory::register] or [Directory::authenticate], so the caller always
//! states which user it is acting for.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};

use crate::{
    Clock, Config, Error, LocalClock,
    budget::{
        Budget, BudgetComparison, CategoryTotals, DEFAULT_SLICE_THRESHOLD,
        aggregate_by_category, budget_vs_actual, collapse_small_slices, effective_budget,
        get_stored_budget, update_budget,
    },
    credentials::{Registration, UserIdentity, authenticate, register},
    db::initialize,
    ledger::{
        LedgerEntry, NewTransaction, Transaction, append_transaction, list_transactions,
        running_balances,
    },
    records::{
        Debt, DebtId, Expense, ExpenseId, Investment, InvestmentId, NewDebt, NewExpense,
        NewInvestment, create_debt, create_expense, create_investment, delete_debt,
        delete_expense, delete_investment, get_debt, get_debts, get_expense, get_expenses,
        get_investment, get_investments, update_debt, update_expense, update_investment,
    },
    report::{FinancialSummary, build_summary},
    user::{UserID, UserProfile, get_balance, get_user_by_id, update_profile},
};

/// An authenticated user.
///
/// Sessions can only be created by logging in or registering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserID,
    display_name: String,
}

impl Session {
    /// The ID of the logged in user.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The name used to greet the logged in user.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl From<UserIdentity> for Session {
    fn from(identity: UserIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            display_name: identity.display_name,
        }
    }
}

/// Owns the database connection and exposes every operation on users and their records.
///
/// Cloning a directory is cheap and the clones share the same connection.
#[derive(Debug, Clone)]
pub struct Directory {
    connection: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl Directory {
    /// Create a directory that reads the date from the system clock in `config.local_timezone`.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an [Error::InvalidTimezoneError] if the timezone is unknown, or
    /// an error if the database cannot be initialized.
    pub fn new(connection: Connection, config: Config) -> Result<Self, Error> {
        let clock = LocalClock::new(&config.local_timezone)?;

        Self::with_clock(connection, config, clock)
    }

    /// Create a directory that reads the date from `clock`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn with_clock(
        connection: Connection,
        config: Config,
        clock: impl Clock + 'static,
    ) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            clock: Arc::new(clock),
            config,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }

    /// Run `operation` in a database transaction that is only committed if it succeeds.
    fn write<T>(
        &self,
        operation: impl FnOnce(&rusqlite::Transaction) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let result = operation(&transaction)?;
        transaction.commit()?;

        Ok(result)
    }

    // ========================================================================
    // CREDENTIALS
    // ========================================================================

    /// Register a new user and log them in.
    ///
    /// # Errors
    /// Returns an [Error::Validation] for empty fields or a malformed email,
    /// or an [Error::DuplicateEmail] if the email is taken.
    pub fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let registration = Registration::new(
            email,
            display_name,
            password,
            self.config.password_hash_cost,
        )?;
        let display_name = registration.display_name().to_owned();

        let user_id = self.write(|transaction| register(registration, transaction))?;

        tracing::info!("Registered user {user_id}");

        Ok(Session {
            user_id,
            display_name,
        })
    }

    /// Log in with an email and password.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if the email is unknown, or an
    /// [Error::InvalidCredentials] if the password is wrong.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, Error> {
        let connection = self.lock()?;

        authenticate(email, password, &connection).map(Session::from)
    }

    // ========================================================================
    // LEDGER
    // ========================================================================

    /// The user's current balance.
    pub fn balance(&self, session: &Session) -> Result<f64, Error> {
        let connection = self.lock()?;
        get_balance(session.user_id, &connection)
    }

    /// Record a transaction dated no later than today and return the new balance.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if the transaction is invalid, in which
    /// case neither the ledger nor the balance change.
    pub fn append_transaction(
        &self,
        session: &Session,
        new_transaction: NewTransaction,
    ) -> Result<f64, Error> {
        let today = self.clock.today();

        let balance = self.write(|transaction| {
            append_transaction(session.user_id, new_transaction, today, transaction)
        })?;

        tracing::info!(
            "Appended transaction for user {}, balance is now {balance}",
            session.user_id
        );

        Ok(balance)
    }

    /// The user's transactions, most recent first.
    ///
    /// Pass `None` for `limit` to get all of them.
    pub fn list_transactions(
        &self,
        session: &Session,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;
        list_transactions(session.user_id, limit, &connection)
    }

    /// The user's transactions, most recent first, each with the balance after it was applied.
    pub fn running_balances(
        &self,
        session: &Session,
        limit: Option<usize>,
    ) -> Result<Vec<LedgerEntry>, Error> {
        let connection = self.lock()?;
        let balance = get_balance(session.user_id, &connection)?;
        let transactions = list_transactions(session.user_id, limit, &connection)?;

        Ok(running_balances(balance, transactions))
    }

    // ========================================================================
    // EXPENSES
    // ========================================================================

    /// Add an expense.
    ///
    /// # Errors
    /// Returns an [Error::DuplicateRecord] if the user already has an expense
    /// with the same name in the same category.
    pub fn add_expense(&self, session: &Session, expense: NewExpense) -> Result<Expense, Error> {
        let expense =
            self.write(|transaction| create_expense(session.user_id, expense, transaction))?;

        tracing::info!("Added expense {} for user {}", expense.id, session.user_id);

        Ok(expense)
    }

    /// Replace an expense.
    pub fn update_expense(
        &self,
        session: &Session,
        expense_id: ExpenseId,
        expense: NewExpense,
    ) -> Result<(), Error> {
        self.write(|transaction| update_expense(session.user_id, expense_id, expense, transaction))?;

        tracing::info!("Updated expense {expense_id} for user {}", session.user_id);

        Ok(())
    }

    /// Delete an expense.
    pub fn delete_expense(&self, session: &Session, expense_id: ExpenseId) -> Result<(), Error> {
        self.write(|transaction| delete_expense(session.user_id, expense_id, transaction))?;

        tracing::info!("Deleted expense {expense_id} for user {}", session.user_id);

        Ok(())
    }

    /// A single expense.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if the expense does not belong to the user.
    pub fn get_expense(&self, session: &Session, expense_id: ExpenseId) -> Result<Expense, Error> {
        let connection = self.lock()?;
        get_expense(session.user_id, expense_id, &connection)
    }

    /// The user's expenses in the order they were added.
    pub fn list_expenses(&self, session: &Session) -> Result<Vec<Expense>, Error> {
        let connection = self.lock()?;
        get_expenses(session.user_id, &connection)
    }

    // ========================================================================
    // DEBTS
    // ========================================================================

    /// Add a debt.
    pub fn add_debt(&self, session: &Session, debt: NewDebt) -> Result<Debt, Error> {
        let debt = self.write(|transaction| create_debt(session.user_id, debt, transaction))?;

        tracing::info!("Added debt {} for user {}", debt.id, session.user_id);

        Ok(debt)
    }

    /// Replace a debt.
    pub fn update_debt(
        &self,
        session: &Session,
        debt_id: DebtId,
        debt: NewDebt,
    ) -> Result<(), Error> {
        self.write(|transaction| update_debt(session.user_id, debt_id, debt, transaction))?;

        tracing::info!("Updated debt {debt_id} for user {}", session.user_id);

        Ok(())
    }

    /// Delete a debt.
    pub fn delete_debt(&self, session: &Session, debt_id: DebtId) -> Result<(), Error> {
        self.write(|transaction| delete_debt(session.user_id, debt_id, transaction))?;

        tracing::info!("Deleted debt {debt_id} for user {}", session.user_id);

        Ok(())
    }

    /// A single debt.
    pub fn get_debt(&self, session: &Session, debt_id: DebtId) -> Result<Debt, Error> {
        let connection = self.lock()?;
        get_debt(session.user_id, debt_id, &connection)
    }

    /// The user's debts in the order they were added.
    pub fn list_debts(&self, session: &Session) -> Result<Vec<Debt>, Error> {
        let connection = self.lock()?;
        get_debts(session.user_id, &connection)
    }

    // ========================================================================
    // INVESTMENTS
    // ========================================================================

    /// Add an investment.
    pub fn add_investment(
        &self,
        session: &Session,
        investment: NewInvestment,
    ) -> Result<Investment, Error> {
        let investment = self
            .write(|transaction| create_investment(session.user_id, investment, transaction))?;

        tracing::info!(
            "Added investment {} for user {}",
            investment.id,
            session.user_id
        );

        Ok(investment)
    }

    /// Replace an investment.
    pub fn update_investment(
        &self,
        session: &Session,
        investment_id: InvestmentId,
        investment: NewInvestment,
    ) -> Result<(), Error> {
        self.write(|transaction| {
            update_investment(session.user_id, investment_id, investment, transaction)
        })?;

        tracing::info!(
            "Updated investment {investment_id} for user {}",
            session.user_id
        );

        Ok(())
    }

    /// Delete an investment.
    pub fn delete_investment(
        &self,
        session: &Session,
        investment_id: InvestmentId,
    ) -> Result<(), Error> {
        self.write(|transaction| delete_investment(session.user_id, investment_id, transaction))?;

        tracing::info!(
            "Deleted investment {investment_id} for user {}",
            session.user_id
        );

        Ok(())
    }

    /// A single investment.
    pub fn get_investment(
        &self,
        session: &Session,
        investment_id: InvestmentId,
    ) -> Result<Investment, Error> {
        let connection = self.lock()?;
        get_investment(session.user_id, investment_id, &connection)
    }

    /// The user's investments in the order they were added.
    pub fn list_investments(&self, session: &Session) -> Result<Vec<Investment>, Error> {
        let connection = self.lock()?;
        get_investments(session.user_id, &connection)
    }

    // ========================================================================
    // BUDGET AND REPORTS
    // ========================================================================

    /// The default budget with the user's changes applied.
    pub fn effective_budget(&self, session: &Session) -> Result<Budget, Error> {
        let connection = self.lock()?;
        let stored = get_stored_budget(session.user_id, &connection)?;

        Ok(effective_budget(&stored))
    }

    /// Replace the user's budget.
    ///
    /// Categories left out of `budget` go back to their defaults.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if a category is blank or repeated, or a
    /// limit is negative. The stored budget is unchanged on error.
    pub fn update_budget(&self, session: &Session, budget: &Budget) -> Result<(), Error> {
        self.write(|transaction| update_budget(session.user_id, budget, transaction))?;

        tracing::info!("Updated budget for user {}", session.user_id);

        Ok(())
    }

    /// Expense totals by category with small categories merged into "other".
    pub fn expense_breakdown(&self, session: &Session) -> Result<CategoryTotals, Error> {
        let connection = self.lock()?;
        let expenses = get_expenses(session.user_id, &connection)?;

        Ok(collapse_small_slices(
            &aggregate_by_category(&expenses),
            DEFAULT_SLICE_THRESHOLD,
        ))
    }

    /// The effective budget compared to expense totals for each category.
    pub fn budget_vs_actual(&self, session: &Session) -> Result<Vec<BudgetComparison>, Error> {
        let connection = self.lock()?;
        let stored = get_stored_budget(session.user_id, &connection)?;
        let expenses = get_expenses(session.user_id, &connection)?;

        Ok(budget_vs_actual(
            &effective_budget(&stored),
            &aggregate_by_category(&expenses),
        ))
    }

    /// Totals across the ledger, records and budget.
    pub fn summary(&self, session: &Session) -> Result<FinancialSummary, Error> {
        let connection = self.lock()?;
        build_summary(session.user_id, &connection)
    }

    // ========================================================================
    // PROFILE
    // ========================================================================

    /// The user's personal and income details.
    pub fn profile(&self, session: &Session) -> Result<UserProfile, Error> {
        let connection = self.lock()?;
        let user = get_user_by_id(session.user_id, &connection)?;

        Ok(user.profile)
    }

    /// Replace the user's personal and income details.
    pub fn update_profile(&self, session: &Session, profile: &UserProfile) -> Result<(), Error> {
        self.write(|transaction| update_profile(session.user_id, profile, transaction))?;

        tracing::info!("Updated profile for user {}", session.user_id);

        Ok(())
    }
}

#[cfg(test)]
mod directory_tests {
    use std::{sync::mpsc, thread, time::Duration};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Config, Error, FixedClock, NewDebt, NewExpense, NewInvestment, NewTransaction,
        PayRate, UserProfile,
        budget::{Budget, CategoryTotals},
        directory::{Directory, Session},
    };

    fn get_test_directory() -> Directory {
        let config = Config {
            password_hash_cost: 4,
            ..Default::default()
        };

        Directory::with_clock(
            Connection::open_in_memory().unwrap(),
            config,
            FixedClock(date!(2025 - 10 - 05)),
        )
        .unwrap()
    }

    fn register_test_user(directory: &Directory) -> Session {
        directory
            .register("foo@bar.baz", "Foo", "hunter2")
            .unwrap()
    }

    #[test]
    fn new_rejects_unknown_timezone() {
        let config = Config {
            local_timezone: "Middle/Earth".to_owned(),
            ..Default::default()
        };

        let result = Directory::new(Connection::open_in_memory().unwrap(), config);

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }

    #[test]
    fn register_then_authenticate() {
        let directory = get_test_directory();
        let registered = register_test_user(&directory);

        let session = directory.authenticate("foo@bar.baz", "hunter2").unwrap();

        assert_eq!(session, registered);
        assert_eq!(session.display_name(), "Foo");
    }

    #[test]
    fn re_registering_keeps_original_account() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);

        let result = directory.register("foo@bar.baz", "Impostor", "letmein");

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(
            directory.authenticate("foo@bar.baz", "hunter2"),
            Ok(session)
        );
        assert_eq!(
            directory.authenticate("foo@bar.baz", "letmein"),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn ledger_scenario_balances_and_order() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        directory
            .append_transaction(
                &session,
                NewTransaction::new(1000.0, date!(2025 - 10 - 01), "Opening balance"),
            )
            .unwrap();

        directory
            .append_transaction(
                &session,
                NewTransaction::new(-45.0, date!(2025 - 10 - 03), "Gas Station"),
            )
            .unwrap();
        let balance = directory
            .append_transaction(
                &session,
                NewTransaction::new(3500.0, date!(2025 - 10 - 04), "Salary"),
            )
            .unwrap();

        assert_eq!(balance, 4455.0);
        assert_eq!(directory.balance(&session), Ok(4455.0));

        let recent: Vec<String> = directory
            .list_transactions(&session, Some(2))
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.description)
            .collect();
        assert_eq!(recent, ["Salary", "Gas Station"]);

        let balances: Vec<f64> = directory
            .running_balances(&session, None)
            .unwrap()
            .iter()
            .map(|entry| entry.balance_after)
            .collect();
        assert_eq!(balances, [4455.0, 955.0, 1000.0]);
    }

    #[test]
    fn rejected_transaction_changes_nothing() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);

        let result = directory.append_transaction(
            &session,
            NewTransaction::new(10.0, date!(2025 - 10 - 06), "From the future"),
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(directory.balance(&session), Ok(0.0));
        assert_eq!(directory.list_transactions(&session, None), Ok(vec![]));
    }

    #[test]
    fn users_cannot_touch_each_others_records() {
        let directory = get_test_directory();
        let alice = register_test_user(&directory);
        let bob = directory
            .register("bob@bar.baz", "Bob", "password")
            .unwrap();
        let expense = directory
            .add_expense(&alice, NewExpense::new("Rent", "rent", 1200.0))
            .unwrap();

        assert_eq!(
            directory.delete_expense(&bob, expense.id),
            Err(Error::NotFound)
        );
        assert_eq!(directory.get_expense(&bob, expense.id), Err(Error::NotFound));
        assert_eq!(directory.list_expenses(&bob), Ok(vec![]));
        assert_eq!(directory.list_expenses(&alice), Ok(vec![expense]));
    }

    #[test]
    fn duplicate_expense_is_rejected() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        directory
            .add_expense(&session, NewExpense::new("Coffee", "Dining Out", 4.5))
            .unwrap();

        let result = directory.add_expense(&session, NewExpense::new("coffee ", "dining out", 5.0));

        assert!(matches!(result, Err(Error::DuplicateRecord(_))));
        assert_eq!(directory.list_expenses(&session).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_duplicate_expenses_only_add_one() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let directory = directory.clone();
                let session = session.clone();
                let name = if i % 2 == 0 { "Coffee" } else { " coffee " };

                thread::spawn(move || {
                    directory.add_expense(&session, NewExpense::new(name, "Dining Out", 4.5))
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter(|result| result.is_err())
                .all(|result| matches!(result, Err(Error::DuplicateRecord(_))))
        );
        assert_eq!(directory.list_expenses(&session).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_transactions_all_reach_the_balance() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        let amounts = [100.0, -20.5, 35.25, -4.75, 60.0, -0.5, 12.0, -81.5];

        let handles: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| {
                let directory = directory.clone();
                let session = session.clone();

                thread::spawn(move || {
                    directory.append_transaction(
                        &session,
                        NewTransaction::new(amount, date!(2025 - 10 - 05), &format!("#{i}")),
                    )
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let want = amounts.iter().sum::<f64>();
        let got = directory.balance(&session).unwrap();
        assert!((got - want).abs() < 1e-9, "want balance {want}, got {got}");
        assert_eq!(
            directory.list_transactions(&session, None).unwrap().len(),
            amounts.len()
        );
    }

    #[test]
    fn password_is_hashed_before_taking_the_connection() {
        let config = Config {
            password_hash_cost: 1,
            ..Default::default()
        };
        let directory = Directory::with_clock(
            Connection::open_in_memory().unwrap(),
            config,
            FixedClock(date!(2025 - 10 - 05)),
        )
        .unwrap();
        let held = directory.lock().unwrap();

        let (sender, receiver) = mpsc::channel();
        let other = directory.clone();
        thread::spawn(move || sender.send(other.register("foo@bar.baz", "Foo", "hunter2")));
        let result = receiver
            .recv_timeout(Duration::from_secs(10))
            .expect("register waited for the connection before hashing");
        drop(held);

        assert!(matches!(result, Err(Error::HashingError(_))));
    }

    #[test]
    fn debts_and_investments_round_trip() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);

        let debt = directory
            .add_debt(&session, NewDebt::new("Car", 8000.0, 6.5, 250.0))
            .unwrap();
        directory
            .update_debt(&session, debt.id, NewDebt::new("Car", 7750.0, 6.5, 250.0))
            .unwrap();
        let investment = directory
            .add_investment(&session, NewInvestment::new("Fund", 500.0, "low"))
            .unwrap();
        directory.delete_investment(&session, investment.id).unwrap();

        assert_eq!(directory.get_debt(&session, debt.id).unwrap().amount_owed, 7750.0);
        assert_eq!(
            directory.get_investment(&session, investment.id),
            Err(Error::NotFound)
        );
        assert_eq!(directory.list_debts(&session).unwrap().len(), 1);
        assert_eq!(directory.list_investments(&session), Ok(vec![]));
    }

    #[test]
    fn budget_update_and_comparison() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        directory
            .add_expense(&session, NewExpense::new("Rent", "Rent", 1300.0))
            .unwrap();
        let budget = Budget::from([("rent".to_owned(), 1250.0), ("pets".to_owned(), 40.0)]);

        directory.update_budget(&session, &budget).unwrap();

        let effective = directory.effective_budget(&session).unwrap();
        assert_eq!(effective.len(), 11);
        assert_eq!(effective["rent"], 1250.0);

        let comparison = directory.budget_vs_actual(&session).unwrap();
        let rent = comparison
            .iter()
            .find(|row| row.category == "rent")
            .unwrap();
        assert_eq!(rent.delta, 50.0);
    }

    #[test]
    fn invalid_budget_keeps_previous_values() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        directory
            .update_budget(&session, &Budget::from([("rent".to_owned(), 1000.0)]))
            .unwrap();

        let result = directory.update_budget(
            &session,
            &Budget::from([("rent".to_owned(), 1.0), ("".to_owned(), 5.0)]),
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(directory.effective_budget(&session).unwrap()["rent"], 1000.0);
    }

    #[test]
    fn expense_breakdown_collapses_small_categories() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        for (name, category, cost) in [
            ("Netflix", "subscriptions", 10.0),
            ("Rent", "rent", 980.0),
            ("Bus", "transportation", 10.0),
        ] {
            directory
                .add_expense(&session, NewExpense::new(name, category, cost))
                .unwrap();
        }

        let breakdown = directory.expense_breakdown(&session).unwrap();

        assert_eq!(
            breakdown,
            CategoryTotals::from([("other".to_owned(), 20.0), ("rent".to_owned(), 980.0)])
        );
    }

    #[test]
    fn profile_and_summary() {
        let directory = get_test_directory();
        let session = register_test_user(&directory);
        let profile = UserProfile {
            income: 4000.0,
            pay_rate: PayRate::Weekly,
            goal_budget: 100.0,
            ..Default::default()
        };
        directory.update_profile(&session, &profile).unwrap();
        directory
            .add_expense(&session, NewExpense::new("Coffee", "dining out", 25.0))
            .unwrap();

        assert_eq!(directory.profile(&session), Ok(profile));

        let summary = directory.summary(&session).unwrap();
        assert_eq!(summary.total_expenses, 25.0);
        assert_eq!(summary.goal_progress, Some(25.0));
    }
}
