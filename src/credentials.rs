//! Registering new users and checking the passwords of returning ones.

use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, PasswordHash,
    user::{UserID, create_user, get_user_by_email},
};

/// Who a user is once their password has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    /// The ID of the authenticated user.
    pub user_id: UserID,
    /// The name used to greet the user.
    pub display_name: String,
}

/// A checked sign-up request with the password already hashed.
///
/// Hashing is slow on purpose, so a registration is prepared before the
/// database is touched and only the insert runs while the connection is held.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    email: String,
    display_name: String,
    password_hash: PasswordHash,
}

impl Registration {
    /// Check the sign-up fields and hash the password.
    ///
    /// The email and display name are trimmed. The password is hashed with
    /// bcrypt using `password_hash_cost` and only the hash is kept.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if a field is empty or the email is not a valid address,
    /// - or [Error::HashingError] if the password could not be hashed.
    pub fn new(
        email: &str,
        display_name: &str,
        password: &str,
        password_hash_cost: u32,
    ) -> Result<Self, Error> {
        let email = email.trim();
        let display_name = display_name.trim();

        if email.is_empty() {
            return Err(Error::Validation("email must not be empty".to_owned()));
        }

        if !EmailAddress::is_valid(email) {
            return Err(Error::Validation(format!(
                "\"{email}\" is not a valid email address"
            )));
        }

        if display_name.is_empty() {
            return Err(Error::Validation("display name must not be empty".to_owned()));
        }

        Ok(Self {
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: PasswordHash::from_raw_password(password, password_hash_cost)?,
        })
    }

    /// The trimmed display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Create a new user with a zero balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if the email is already registered,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn register(registration: Registration, connection: &Connection) -> Result<UserID, Error> {
    let user = create_user(
        &registration.email,
        &registration.display_name,
        registration.password_hash,
        connection,
    )?;

    Ok(user.id)
}

/// Check `password` against the stored hash for `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no user has the email,
/// - [Error::InvalidCredentials] if the password is wrong,
/// - [Error::HashingError] if the stored hash could not be checked,
/// - or [Error::StorageError] if there is some other SQL error.
pub fn authenticate(
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<UserIdentity, Error> {
    let user = get_user_by_email(email.trim(), connection).inspect_err(|error| {
        if *error == Error::NotFound {
            tracing::warn!("Log in attempt for unregistered email");
        }
    })?;

    if !user.password_hash.verify(password)? {
        tracing::warn!("Log in attempt with wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    Ok(UserIdentity {
        user_id: user.id,
        display_name: user.display_name,
    })
}
