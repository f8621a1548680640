//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, PasswordHash, is_unique_violation};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How often the user gets paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayRate {
    /// Paid every week.
    Weekly,
    /// Paid every second week.
    BiWeekly,
    /// Paid once a month.
    #[default]
    Monthly,
}

impl PayRate {
    /// The name used when storing or displaying the pay rate.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayRate::Weekly => "weekly",
            PayRate::BiWeekly => "bi-weekly",
            PayRate::Monthly => "monthly",
        }
    }
}

impl Display for PayRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(PayRate::Weekly),
            "bi-weekly" | "biweekly" => Ok(PayRate::BiWeekly),
            "monthly" => Ok(PayRate::Monthly),
            other => Err(Error::Validation(format!("unknown pay rate \"{other}\""))),
        }
    }
}

impl ToSql for PayRate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PayRate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Personal, banking and income details for a user.
///
/// None of these fields affect how the ledger or records behave, they are
/// kept for display and for the goal budget progress in reports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's date of birth.
    pub birth_date: Option<Date>,
    /// The user's gender.
    pub gender: Option<String>,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The name of the user's bank.
    pub bank_name: Option<String>,
    /// The user's bank account number.
    pub account_number: Option<String>,
    /// The routing number of the user's bank.
    pub routing_number: Option<String>,
    /// The kind of bank account, e.g. "checking" or "savings".
    pub account_type: Option<String>,
    /// The user's income per pay period.
    pub income: f64,
    /// How often the user is paid.
    pub pay_rate: PayRate,
    /// The total the user aims to spend each month.
    pub goal_budget: f64,
}

impl UserProfile {
    /// Check that the numeric fields are finite and not negative.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] naming the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.income.is_finite() || self.income < 0.0 {
            return Err(Error::Validation(
                "income must be zero or more".to_owned(),
            ));
        }

        if !self.goal_budget.is_finite() || self.goal_budget < 0.0 {
            return Err(Error::Validation(
                "goal budget must be zero or more".to_owned(),
            ));
        }

        Ok(())
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` and `email` are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user logs in with.
    pub email: String,
    /// The name used to greet the user.
    pub display_name: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The current balance of the user's account.
    pub balance: f64,
    /// Personal, banking and income details.
    pub profile: UserProfile,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                password TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0,
                birth_date TEXT,
                gender TEXT,
                phone TEXT,
                bank_name TEXT,
                account_number TEXT,
                routing_number TEXT,
                account_type TEXT,
                income REAL NOT NULL DEFAULT 0,
                pay_rate TEXT NOT NULL DEFAULT 'monthly',
                goal_budget REAL NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

const SELECT_USER: &str = "SELECT id, email, display_name, password, balance, birth_date, gender,
    phone, bank_name, account_number, routing_number, account_type, income, pay_rate, goal_budget
    FROM user";

/// Create and insert a new user into the database.
///
/// The user starts with a zero balance and an empty profile.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - or [Error::StorageError] if some other SQL related error occurred.
pub fn create_user(
    email: &str,
    display_name: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (email, display_name, password) VALUES (?1, ?2, ?3)",
            (email, display_name, password_hash.as_ref()),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateEmail
            } else {
                error.into()
            }
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_owned(),
        display_name: display_name.to_owned(),
        password_hash,
        balance: 0.0,
        profile: UserProfile::default(),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user whose email exactly matches `email`.
///
/// Emails are compared case-sensitively.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has the email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the current balance for a user.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn get_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT balance FROM user WHERE id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Add `amount` to the user's balance and return the new balance.
///
/// The increment is done in SQL so concurrent writers cannot lose an update.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn add_to_balance(user_id: UserID, amount: f64, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "UPDATE user SET balance = balance + ?1 WHERE id = ?2 RETURNING balance",
            (amount, user_id.as_i64()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Replace the profile details for a user.
///
/// # Errors
///
/// Returns a:
/// - [Error::Validation] if the profile has negative or non-finite amounts,
/// - [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_profile(
    user_id: UserID,
    profile: &UserProfile,
    connection: &Connection,
) -> Result<(), Error> {
    profile.validate()?;

    let rows_affected = connection.execute(
        "UPDATE user SET birth_date = ?1, gender = ?2, phone = ?3, bank_name = ?4,
            account_number = ?5, routing_number = ?6, account_type = ?7, income = ?8,
            pay_rate = ?9, goal_budget = ?10
         WHERE id = ?11",
        rusqlite::params![
            profile.birth_date,
            profile.gender,
            profile.phone,
            profile.bank_name,
            profile.account_number,
            profile.routing_number,
            profile.account_type,
            profile.income,
            profile.pay_rate,
            profile.goal_budget,
            user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        display_name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        balance: row.get(4)?,
        profile: UserProfile {
            birth_date: row.get(5)?,
            gender: row.get(6)?,
            phone: row.get(7)?,
            bank_name: row.get(8)?,
            account_number: row.get(9)?,
            routing_number: row.get(10)?,
            account_type: row.get(11)?,
            income: row.get(12)?,
            pay_rate: row.get(13)?,
            goal_budget: row.get(14)?,
        },
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        test_utils::count_users,
        user::{
            PayRate, UserID, UserProfile, add_to_balance, create_user,
            get_balance, get_user_by_email, get_user_by_id, update_profile,
        },
    };

    use super::{Error, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user("foo@bar.baz", "Foo", password_hash.clone(), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "foo@bar.baz");
        assert_eq!(inserted_user.display_name, "Foo");
        assert_eq!(inserted_user.password_hash, password_hash);
        assert_eq!(inserted_user.balance, 0.0);
        assert_eq!(inserted_user.profile, UserProfile::default());
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        let original = create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let result = create_user(
            "foo@bar.baz",
            "Impostor",
            PasswordHash::new_unchecked("hunter3"),
            &db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(get_user_by_id(original.id, &db_connection), Ok(original));
    }

    #[test]
    fn emails_are_case_sensitive() {
        let db_connection = get_db_connection();
        create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let result = create_user(
            "Foo@bar.baz",
            "Other Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        );

        assert!(result.is_ok());
        assert_eq!(
            get_user_by_email("FOO@BAR.BAZ", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_email() {
        let db_connection = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("foo@bar.baz", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        let count = count_users(&db_connection);
        assert_eq!(0, count, "Want zero users before insertion, got {count}");

        create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let count = count_users(&db_connection);
        assert_eq!(1, count, "Want one user after insertion, got {count}");
    }

    #[test]
    fn add_to_balance_accumulates() {
        let db_connection = get_db_connection();
        let user = create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        add_to_balance(user.id, 100.0, &db_connection).unwrap();
        let new_balance = add_to_balance(user.id, -150.0, &db_connection).unwrap();

        assert_eq!(new_balance, -50.0);
        assert_eq!(get_balance(user.id, &db_connection), Ok(-50.0));
    }

    #[test]
    fn add_to_balance_fails_for_missing_user() {
        let db_connection = get_db_connection();

        let result = add_to_balance(UserID::new(42), 10.0, &db_connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_profile_round_trips() {
        let db_connection = get_db_connection();
        let user = create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();
        let profile = UserProfile {
            birth_date: Some(date!(1990 - 07 - 21)),
            bank_name: Some("Bank of Foo".to_owned()),
            account_number: Some("12345678".to_owned()),
            income: 2500.0,
            pay_rate: PayRate::BiWeekly,
            goal_budget: 1800.0,
            ..Default::default()
        };

        update_profile(user.id, &profile, &db_connection).unwrap();

        let got = get_user_by_id(user.id, &db_connection).unwrap();
        assert_eq!(got.profile, profile);
    }

    #[test]
    fn update_profile_rejects_negative_goal_budget() {
        let db_connection = get_db_connection();
        let user = create_user(
            "foo@bar.baz",
            "Foo",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();
        let profile = UserProfile {
            goal_budget: -1.0,
            ..Default::default()
        };

        let result = update_profile(user.id, &profile, &db_connection);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn pay_rate_parses_alternate_spelling() {
        assert_eq!("biweekly".parse::<PayRate>(), Ok(PayRate::BiWeekly));
        assert_eq!(" Weekly ".parse::<PayRate>(), Ok(PayRate::Weekly));
        assert!("fortnightly".parse::<PayRate>().is_err());
    }
}
