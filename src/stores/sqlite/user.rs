//! Implements a SQLite backed user store.

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, DbPool, MapRow},
    models::{NewUser, PasswordHash, User, UserID, Username},
    stores::UserStore,
};

/// Creates and retrieves users to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    pool: DbPool,
}

impl SQLiteUserStore {
    /// Create a new user store with a SQLite connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create a user in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateUsername] if the username is taken,
    /// - [Error::DuplicateEmail] if the email address is taken,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let connection = self.pool.get()?;
        let now = OffsetDateTime::now_utc();

        connection.execute(
            "INSERT INTO users (username, email, password, full_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            (
                new_user.username.as_ref(),
                new_user.email.to_string(),
                new_user.password_hash.to_string(),
                &new_user.full_name,
                now,
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieve the user with `user_id` from the database.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if there is no such
    /// user, or an [Error::SqlError] if there is some other SQL error.
    fn get(&self, user_id: UserID) -> Result<User, Error> {
        self.pool
            .get()?
            .prepare(
                "SELECT id, username, email, password, full_name, created_at, updated_at
                 FROM users WHERE id = :id",
            )?
            .query_row(&[(":id", &user_id.as_i64())], Self::map_row)
            .map_err(|error| error.into())
    }

    /// Retrieve the user with `username` from the database.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if there is no such
    /// user, or an [Error::SqlError] if there is some other SQL error.
    fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.pool
            .get()?
            .prepare(
                "SELECT id, username, email, password, full_name, created_at, updated_at
                 FROM users WHERE username = :username",
            )?
            .query_row(&[(":username", &username)], Self::map_row)
            .map_err(|error| error.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                full_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserID::new(row.get(offset)?);

        let raw_username: String = row.get(offset + 1)?;
        let username = Username::new_unchecked(&raw_username);

        let raw_email: String = row.get(offset + 2)?;
        let email = EmailAddress::new_unchecked(raw_email);

        let raw_password_hash: String = row.get(offset + 3)?;
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(User {
            id,
            username,
            email,
            password_hash,
            full_name: row.get(offset + 4)?,
            created_at: row.get(offset + 5)?,
            updated_at: row.get(offset + 6)?,
        })
    }
}
