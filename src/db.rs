//! This module defines the database pool, the schema and the traits for
//! mapping rows to the domain models.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    Error,
    stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
};

/// A bounded pool of SQLite connections shared by the stores.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Create a connection pool for the SQLite database at `database_path`.
///
/// The parent directory is created if it does not exist. Every connection
/// handed out by the pool has foreign key enforcement switched on.
///
/// # Errors
/// Returns an error if the pool could not be built.
pub fn create_pool(database_path: &Path, max_size: u32) -> Result<DbPool, r2d2::Error> {
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let manager = SqliteConnectionManager::file(database_path).with_init(|connection| {
        connection.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
    });

    Pool::builder().max_size(max_size).build(manager)
}

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type the row is converted into.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type.
    ///
    /// The `offset` indicates which column the row should be read from.
    /// This is useful in cases where tables have been joined and you want to construct two different types from the one query.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// The categories every user starts with: `(name, type, color)`.
///
/// Seeded once, the first time the database is initialized with no default
/// categories present.
const DEFAULT_CATEGORIES: [(&str, &str, &str); 12] = [
    ("Salary", "INCOME", "#4CAF50"),
    ("Freelance", "INCOME", "#8BC34A"),
    ("Investment", "INCOME", "#00BCD4"),
    ("Other Income", "INCOME", "#009688"),
    ("Food & Dining", "EXPENSE", "#FF6B6B"),
    ("Transportation", "EXPENSE", "#FF9800"),
    ("Housing", "EXPENSE", "#795548"),
    ("Utilities", "EXPENSE", "#607D8B"),
    ("Entertainment", "EXPENSE", "#9C27B0"),
    ("Healthcare", "EXPENSE", "#E91E63"),
    ("Shopping", "EXPENSE", "#3F51B5"),
    ("Other Expense", "EXPENSE", "#9E9E9E"),
];

/// Initialize the database by creating the tables for the domain models and
/// seeding the default categories.
///
/// Safe to call on every startup: tables are created only if missing and the
/// defaults are only inserted when no default category exists yet.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteCategoryStore::create_table(&transaction)?;
    SQLiteTransactionStore::create_table(&transaction)?;

    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let default_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM categories WHERE is_default = 1",
        [],
        |row| row.get(0),
    )?;

    if default_count > 0 {
        return Ok(());
    }

    let now = time::OffsetDateTime::now_utc();
    let mut statement = connection.prepare(
        "INSERT INTO categories (name, description, type, color, user_id, is_default, created_at, updated_at)
         VALUES (?1, NULL, ?2, ?3, NULL, 1, ?4, ?4)",
    )?;

    for (name, category_type, color) in DEFAULT_CATEGORIES {
        statement.execute((name, category_type, color, now))?;
    }

    Ok(())
}
