//! Plaintext passwords on their way in and the bcrypt digests that are stored instead.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A plaintext password that is known to be non-empty.
///
/// It only exists long enough to be turned into a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Accept `password` if it is not empty.
    ///
    /// Whitespace is significant and is not trimmed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] for an empty string.
    pub fn new(password: &str) -> Result<Self, Error> {
        if password.is_empty() {
            Err(Error::Validation("password must not be empty".to_owned()))
        } else {
            Ok(Self(password.to_owned()))
        }
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(password: &str) -> Self {
        Self(password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt digest of a user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Salt and hash `password`.
    ///
    /// Each increment of `cost` doubles the work needed to hash or verify.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if bcrypt rejects the cost or fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a digest that was read back from the database.
    pub fn new_unchecked(digest: &str) -> Self {
        Self(digest.to_owned())
    }

    /// Validate and hash a plaintext password in one step.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] for an empty password, or an
    /// [Error::HashingError] if hashing fails.
    pub fn from_raw_password(password: &str, cost: u32) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(password)?, cost)
    }

    /// Whether `password` produces this digest.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored digest is not valid bcrypt.
    pub fn verify(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
