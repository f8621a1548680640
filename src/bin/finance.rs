use std::{io, path::Path, process::ExitCode};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker::{
    Budget, Clock, Config, DebtId, Directory, ExpenseId, InvestmentId, LocalClock, NewDebt,
    NewExpense, NewInvestment, NewTransaction, PasswordHash, PayRate, Session, UserProfile,
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Keep track of your balance, expenses, debts, investments and budget.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, global = true, default_value = "finance.db")]
    db_path: String,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, global = true, default_value = "Etc/UTC")]
    timezone: String,

    /// The bcrypt cost for hashing new passwords.
    #[arg(long, global = true, default_value_t = PasswordHash::DEFAULT_COST)]
    hash_cost: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Show the current balance.
    Balance {
        #[arg(long)]
        email: String,
    },
    /// Record a credit (positive amount) or debit (negative amount).
    AddTransaction {
        #[arg(long)]
        email: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long)]
        description: String,
        /// The date in the format YYYY-MM-DD, defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List transactions with the balance after each one.
    Transactions {
        #[arg(long)]
        email: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Add a recurring expense.
    AddExpense {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        cost: f64,
    },
    /// Change an expense, keeping any field that is not given.
    UpdateExpense {
        #[arg(long)]
        email: String,
        id: ExpenseId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
    },
    /// Delete an expense.
    DeleteExpense {
        #[arg(long)]
        email: String,
        id: ExpenseId,
    },
    /// List expenses and the breakdown by category.
    Expenses {
        #[arg(long)]
        email: String,
    },
    /// Add a debt.
    AddDebt {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount_owed: f64,
        #[arg(long, default_value_t = 0.0)]
        interest_rate: f64,
        #[arg(long)]
        monthly_payment: f64,
    },
    /// Change a debt, keeping any field that is not given.
    UpdateDebt {
        #[arg(long)]
        email: String,
        id: DebtId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount_owed: Option<f64>,
        #[arg(long)]
        interest_rate: Option<f64>,
        #[arg(long)]
        monthly_payment: Option<f64>,
    },
    /// Delete a debt.
    DeleteDebt {
        #[arg(long)]
        email: String,
        id: DebtId,
    },
    /// List debts.
    Debts {
        #[arg(long)]
        email: String,
    },
    /// Add an investment.
    AddInvestment {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        risk_level: String,
    },
    /// Change an investment, keeping any field that is not given.
    UpdateInvestment {
        #[arg(long)]
        email: String,
        id: InvestmentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        risk_level: Option<String>,
    },
    /// Delete an investment.
    DeleteInvestment {
        #[arg(long)]
        email: String,
        id: InvestmentId,
    },
    /// List investments.
    Investments {
        #[arg(long)]
        email: String,
    },
    /// Show personal and income details.
    Profile {
        #[arg(long)]
        email: String,
    },
    /// Change personal and income details, keeping any field that is not given.
    SetProfile {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        changes: ProfileChanges,
    },
    /// Compare the budget against expenses.
    Budget {
        #[arg(long)]
        email: String,
    },
    /// Replace the budget, e.g. `set-budget rent=1500 "dining out=150"`.
    SetBudget {
        #[arg(long)]
        email: String,
        #[arg(value_parser = parse_budget_entry)]
        entries: Vec<(String, f64)>,
    },
    /// Show a summary of all finances.
    Report {
        #[arg(long)]
        email: String,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ProfileChanges {
    /// The date of birth in the format YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    birth_date: Option<Date>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    bank_name: Option<String>,
    #[arg(long)]
    account_number: Option<String>,
    #[arg(long)]
    routing_number: Option<String>,
    /// The kind of bank account, e.g. "checking" or "savings".
    #[arg(long)]
    account_type: Option<String>,
    /// Income per pay period.
    #[arg(long)]
    income: Option<f64>,
    /// One of "weekly", "bi-weekly" or "monthly".
    #[arg(long)]
    pay_rate: Option<PayRate>,
    /// The total to aim to spend each month.
    #[arg(long)]
    goal_budget: Option<f64>,
}

impl ProfileChanges {
    fn apply(self, profile: &mut UserProfile) {
        if let Some(birth_date) = self.birth_date {
            profile.birth_date = Some(birth_date);
        }
        for (field, change) in [
            (&mut profile.gender, self.gender),
            (&mut profile.phone, self.phone),
            (&mut profile.bank_name, self.bank_name),
            (&mut profile.account_number, self.account_number),
            (&mut profile.routing_number, self.routing_number),
            (&mut profile.account_type, self.account_type),
        ] {
            if let Some(value) = change {
                *field = Some(value);
            }
        }
        if let Some(income) = self.income {
            profile.income = income;
        }
        if let Some(pay_rate) = self.pay_rate {
            profile.pay_rate = pay_rate;
        }
        if let Some(goal_budget) = self.goal_budget {
            profile.goal_budget = goal_budget;
        }
    }
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let stderr_log = tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(filter)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = Path::new(&args.db_path);
    let config = Config {
        password_hash_cost: args.hash_cost,
        local_timezone: args.timezone.clone(),
    };
    let clock = LocalClock::new(&config.local_timezone)?;
    let directory = Directory::new(Connection::open(db_path)?, config)?;

    match args.command {
        Command::Register { email, name } => {
            let Some(password) = prompt_new_password()? else {
                return Ok(());
            };
            let session = directory.register(&email, &name, &password)?;
            println!("Welcome, {}!", session.display_name());
        }
        Command::Balance { email } => {
            let session = log_in(&directory, &email)?;
            println!("{:.2}", directory.balance(&session)?);
        }
        Command::AddTransaction {
            email,
            amount,
            description,
            date,
            notes,
        } => {
            let session = log_in(&directory, &email)?;
            let mut transaction =
                NewTransaction::new(amount, date.unwrap_or_else(|| clock.today()), &description);
            if let Some(notes) = notes {
                transaction = transaction.notes(&notes);
            }
            let balance = directory.append_transaction(&session, transaction)?;
            println!("New balance: {balance:.2}");
        }
        Command::Transactions { email, limit } => {
            let session = log_in(&directory, &email)?;
            for entry in directory.running_balances(&session, limit)? {
                let transaction = entry.transaction;
                println!(
                    "{}  {:<30} {:>10.2} {:>10.2}",
                    transaction.date,
                    transaction.description,
                    transaction.amount,
                    entry.balance_after
                );
            }
        }
        Command::AddExpense {
            email,
            name,
            category,
            cost,
        } => {
            let session = log_in(&directory, &email)?;
            let expense =
                directory.add_expense(&session, NewExpense::new(&name, &category, cost))?;
            println!("Added expense #{}", expense.id);
        }
        Command::UpdateExpense {
            email,
            id,
            name,
            category,
            cost,
        } => {
            let session = log_in(&directory, &email)?;
            let current = directory.get_expense(&session, id)?;
            let expense = NewExpense::new(
                name.as_deref().unwrap_or(&current.name),
                category.as_deref().unwrap_or(&current.category),
                cost.unwrap_or(current.cost),
            );
            directory.update_expense(&session, id, expense)?;
            println!("Updated expense #{id}");
        }
        Command::DeleteExpense { email, id } => {
            let session = log_in(&directory, &email)?;
            directory.delete_expense(&session, id)?;
            println!("Deleted expense #{id}");
        }
        Command::Expenses { email } => {
            let session = log_in(&directory, &email)?;
            for expense in directory.list_expenses(&session)? {
                println!(
                    "#{:<4} {:<30} {:<20} {:>10.2}",
                    expense.id, expense.name, expense.category, expense.cost
                );
            }
            println!();
            for (category, total) in directory.expense_breakdown(&session)? {
                println!("{category:<20} {total:>10.2}");
            }
        }
        Command::AddDebt {
            email,
            name,
            amount_owed,
            interest_rate,
            monthly_payment,
        } => {
            let session = log_in(&directory, &email)?;
            let debt = directory.add_debt(
                &session,
                NewDebt::new(&name, amount_owed, interest_rate, monthly_payment),
            )?;
            println!("Added debt #{}", debt.id);
        }
        Command::UpdateDebt {
            email,
            id,
            name,
            amount_owed,
            interest_rate,
            monthly_payment,
        } => {
            let session = log_in(&directory, &email)?;
            let current = directory.get_debt(&session, id)?;
            let debt = NewDebt::new(
                name.as_deref().unwrap_or(&current.name),
                amount_owed.unwrap_or(current.amount_owed),
                interest_rate.unwrap_or(current.interest_rate),
                monthly_payment.unwrap_or(current.monthly_payment),
            );
            directory.update_debt(&session, id, debt)?;
            println!("Updated debt #{id}");
        }
        Command::DeleteDebt { email, id } => {
            let session = log_in(&directory, &email)?;
            directory.delete_debt(&session, id)?;
            println!("Deleted debt #{id}");
        }
        Command::Debts { email } => {
            let session = log_in(&directory, &email)?;
            for debt in directory.list_debts(&session)? {
                println!(
                    "#{:<4} {:<30} {:>10.2} {:>6.2}% {:>10.2}/month",
                    debt.id, debt.name, debt.amount_owed, debt.interest_rate, debt.monthly_payment
                );
            }
        }
        Command::AddInvestment {
            email,
            name,
            amount,
            risk_level,
        } => {
            let session = log_in(&directory, &email)?;
            let investment = directory
                .add_investment(&session, NewInvestment::new(&name, amount, &risk_level))?;
            println!("Added investment #{}", investment.id);
        }
        Command::UpdateInvestment {
            email,
            id,
            name,
            amount,
            risk_level,
        } => {
            let session = log_in(&directory, &email)?;
            let current = directory.get_investment(&session, id)?;
            let investment = NewInvestment::new(
                name.as_deref().unwrap_or(&current.name),
                amount.unwrap_or(current.amount),
                risk_level.as_deref().unwrap_or(&current.risk_level),
            );
            directory.update_investment(&session, id, investment)?;
            println!("Updated investment #{id}");
        }
        Command::DeleteInvestment { email, id } => {
            let session = log_in(&directory, &email)?;
            directory.delete_investment(&session, id)?;
            println!("Deleted investment #{id}");
        }
        Command::Investments { email } => {
            let session = log_in(&directory, &email)?;
            for investment in directory.list_investments(&session)? {
                println!(
                    "#{:<4} {:<30} {:>10.2} {}",
                    investment.id, investment.name, investment.amount, investment.risk_level
                );
            }
        }
        Command::Profile { email } => {
            let session = log_in(&directory, &email)?;
            let profile = directory.profile(&session)?;
            let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_owned());

            println!(
                "Date of birth:   {}",
                profile
                    .birth_date
                    .map_or_else(|| "-".to_owned(), |date| date.to_string())
            );
            println!("Gender:          {}", show(&profile.gender));
            println!("Phone:           {}", show(&profile.phone));
            println!("Bank:            {}", show(&profile.bank_name));
            println!("Account number:  {}", show(&profile.account_number));
            println!("Routing number:  {}", show(&profile.routing_number));
            println!("Account type:    {}", show(&profile.account_type));
            println!("Income:          {:.2} {}", profile.income, profile.pay_rate);
            println!("Goal budget:     {:.2}", profile.goal_budget);
        }
        Command::SetProfile { email, changes } => {
            let session = log_in(&directory, &email)?;
            let mut profile = directory.profile(&session)?;
            changes.apply(&mut profile);
            directory.update_profile(&session, &profile)?;
            println!("Profile updated.");
        }
        Command::Budget { email } => {
            let session = log_in(&directory, &email)?;
            println!(
                "{:<20} {:>10} {:>10} {:>10}",
                "category", "budgeted", "actual", "delta"
            );
            for row in directory.budget_vs_actual(&session)? {
                println!(
                    "{:<20} {:>10.2} {:>10.2} {:>+10.2}",
                    row.category, row.budgeted, row.actual, row.delta
                );
            }
        }
        Command::SetBudget { email, entries } => {
            let session = log_in(&directory, &email)?;
            let budget: Budget = entries.into_iter().collect();
            directory.update_budget(&session, &budget)?;
            println!("Budget updated.");
        }
        Command::Report { email, json } => {
            let session = log_in(&directory, &email)?;
            let summary = directory.summary(&session)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Balance:                {:.2}", summary.balance);
                println!("Transactions:           {}", summary.transaction_count);
                println!("Total expenses:         {:.2}", summary.total_expenses);
                println!("Total debt owed:        {:.2}", summary.total_debt_owed);
                println!(
                    "Monthly debt payments:  {:.2}",
                    summary.total_monthly_debt_payments
                );
                println!("Total investments:      {:.2}", summary.total_investments);
                println!("Monthly budget:         {:.2}", summary.total_budget);
                match summary.goal_progress {
                    Some(progress) => println!("Goal progress:          {progress:.0}%"),
                    None => println!("Goal progress:          no goal set"),
                }
            }
        }
    }

    Ok(())
}

fn log_in(directory: &Directory, email: &str) -> Result<Session, Box<dyn std::error::Error>> {
    let password = rpassword::prompt_password("Password: ")?;

    Ok(directory.authenticate(email, &password)?)
}

/// Ask for a password twice, returning `None` if stdin is closed.
fn prompt_new_password() -> Result<Option<String>, io::Error> {
    loop {
        let first_password = match rpassword::prompt_password("Choose a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        let second_password = match rpassword::prompt_password("Enter the same password again: ")
        {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        return Ok(Some(first_password));
    }
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, DATE_FORMAT).map_err(|error| format!("invalid date \"{text}\": {error}"))
}

fn parse_budget_entry(text: &str) -> Result<(String, f64), String> {
    let (category, limit) = text
        .rsplit_once('=')
        .ok_or_else(|| format!("expected CATEGORY=LIMIT, got \"{text}\""))?;
    let limit = limit
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid limit for \"{category}\": {error}"))?;

    Ok((category.to_owned(), limit))
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use finance_tracker::{PayRate, UserProfile};
    use time::macros::date;

    use crate::{Args, Command, parse_budget_entry};

    #[test]
    fn command_line_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn update_debt_keeps_missing_fields_empty() {
        let args = Args::parse_from([
            "finance",
            "update-debt",
            "--email",
            "foo@bar.baz",
            "3",
            "--amount-owed",
            "750",
        ]);

        match args.command {
            Command::UpdateDebt {
                id,
                name,
                amount_owed,
                interest_rate,
                monthly_payment,
                ..
            } => {
                assert_eq!(id, 3);
                assert_eq!(name, None);
                assert_eq!(amount_owed, Some(750.0));
                assert_eq!(interest_rate, None);
                assert_eq!(monthly_payment, None);
            }
            command => panic!("want update-debt, got {command:?}"),
        }
    }

    #[test]
    fn profile_changes_only_touch_given_fields() {
        let args = Args::parse_from([
            "finance",
            "set-profile",
            "--email",
            "foo@bar.baz",
            "--pay-rate",
            "bi-weekly",
            "--bank-name",
            "Kiwibank",
            "--birth-date",
            "1990-02-03",
        ]);
        let Command::SetProfile { changes, .. } = args.command else {
            panic!("want set-profile");
        };
        let mut profile = UserProfile {
            income: 2400.0,
            phone: Some("021 555 0100".to_owned()),
            ..Default::default()
        };

        changes.apply(&mut profile);

        assert_eq!(profile.pay_rate, PayRate::BiWeekly);
        assert_eq!(profile.bank_name.as_deref(), Some("Kiwibank"));
        assert_eq!(profile.birth_date, Some(date!(1990 - 02 - 03)));
        assert_eq!(profile.income, 2400.0);
        assert_eq!(profile.phone.as_deref(), Some("021 555 0100"));
    }

    #[test]
    fn budget_entry_splits_on_last_equals() {
        assert_eq!(
            parse_budget_entry("dining out=150"),
            Ok(("dining out".to_owned(), 150.0))
        );
        assert!(parse_budget_entry("rent").is_err());
        assert!(parse_budget_entry("rent=lots").is_err());
    }
}
