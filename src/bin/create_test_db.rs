use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::Duration;

use finance_tracker::{
    Budget, Clock, Config, Directory, FixedClock, LocalClock, NewDebt, NewExpense,
    NewInvestment, NewTransaction, PasswordHash, PayRate, UserProfile,
};

/// A utility for creating a demo database for the finance CLI.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let today = LocalClock::new(&args.timezone)?.today();
    let config = Config {
        password_hash_cost: PasswordHash::DEFAULT_COST,
        local_timezone: args.timezone,
    };

    println!("Creating database at {output_path:#?}");
    let directory =
        Directory::with_clock(Connection::open(output_path)?, config, FixedClock(today))?;

    println!("Creating test user test@example.com with the password \"test\"...");
    let session = directory.register("test@example.com", "Test User", "test")?;

    directory.update_profile(
        &session,
        &UserProfile {
            income: 2400.0,
            pay_rate: PayRate::BiWeekly,
            goal_budget: 2500.0,
            ..Default::default()
        },
    )?;

    println!("Adding transactions...");
    for (days_ago, amount, description) in [
        (30, 1000.0, "Opening balance"),
        (28, 2400.0, "Salary"),
        (27, -1200.0, "Rent"),
        (20, -85.3, "Groceries"),
        (14, 2400.0, "Salary"),
        (12, -45.0, "Gas Station"),
        (3, -64.5, "Power bill"),
    ] {
        directory.append_transaction(
            &session,
            NewTransaction::new(amount, today - Duration::days(days_ago), description),
        )?;
    }

    println!("Adding expenses, debts and investments...");
    for (name, category, cost) in [
        ("Rent", "rent", 1200.0),
        ("Groceries", "groceries", 380.0),
        ("Power", "utilities", 130.0),
        ("Bus pass", "transportation", 60.0),
        ("Coffee", "dining out", 45.0),
        ("Streaming", "subscriptions", 18.0),
    ] {
        directory.add_expense(&session, NewExpense::new(name, category, cost))?;
    }

    directory.add_debt(&session, NewDebt::new("Car loan", 8000.0, 6.5, 250.0))?;
    directory.add_debt(&session, NewDebt::new("Credit card", 1500.0, 19.9, 75.0))?;
    directory.add_investment(&session, NewInvestment::new("Index fund", 5000.0, "low"))?;

    directory.update_budget(
        &session,
        &Budget::from([("groceries".to_owned(), 350.0), ("pets".to_owned(), 40.0)]),
    )?;

    println!("Success!");

    Ok(())
}
