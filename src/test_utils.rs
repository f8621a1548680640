//! Helpers shared by the unit tests.

use rusqlite::Connection;

use crate::{
    PasswordHash,
    db::initialize,
    user::{User, create_user},
};

/// Create an in-memory database with the full schema.
pub fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// Create an in-memory database with the full schema and one registered user.
pub fn get_test_connection_with_user() -> (Connection, User) {
    let connection = get_test_connection();
    let user = create_test_user("foo@bar.baz", &connection);
    (connection, user)
}

/// Register a user with a dummy password hash.
pub fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        email,
        "Test User",
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}

/// Get the number of registered users.
pub fn count_users(connection: &Connection) -> usize {
    connection
        .query_row("SELECT COUNT(id) FROM user", [], |row| row.get::<_, i64>(0))
        .expect("Could not count users") as usize
}
