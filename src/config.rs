//! Settings that control how the [Directory](crate::Directory) behaves.

use crate::PasswordHash;

/// The configuration for a [Directory](crate::Directory).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The bcrypt cost used when hashing new passwords.
    ///
    /// Lower values are only suitable for tests.
    pub password_hash_cost: u32,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password_hash_cost: PasswordHash::DEFAULT_COST,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }
}
