//! Implements a SQLite backed category store.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, DbPool, MapRow},
    models::{Category, CategoryName, CategoryType, Color, DatabaseID, UserID},
    stores::{CategoryData, CategoryStore},
};

/// Creates and retrieves transaction categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    pool: DbPool,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CATEGORY_COLUMNS: &str =
    "id, name, description, type, color, user_id, is_default, created_at, updated_at";

impl CategoryStore for SQLiteCategoryStore {
    /// Create a user-owned category in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn create(&self, data: CategoryData, user_id: UserID) -> Result<Category, Error> {
        let connection = self.pool.get()?;
        let now = OffsetDateTime::now_utc();

        connection.execute(
            "INSERT INTO categories (name, description, type, color, user_id, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            (
                data.name.as_ref(),
                &data.description,
                data.category_type.as_str(),
                data.color.as_ref(),
                user_id.as_i64(),
                now,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Category {
            id,
            name: data.name,
            description: data.description,
            category_type: data.category_type,
            color: data.color,
            user_id: Some(user_id),
            is_default: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieve the category with `category_id`.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if there is no such
    /// category, or an [Error::SqlError] if there is some other SQL error.
    fn get(&self, category_id: DatabaseID) -> Result<Category, Error> {
        self.pool
            .get()?
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = :id"
            ))?
            .query_row(&[(":id", &category_id)], Self::map_row)
            .map_err(|error| error.into())
    }

    /// Retrieve the categories visible to `user_id`: their own categories and
    /// the system defaults, ordered by name.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_visible(&self, user_id: UserID) -> Result<Vec<Category>, Error> {
        self.pool
            .get()?
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories
                 WHERE user_id = :user_id OR is_default = 1
                 ORDER BY name ASC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    /// Retrieve the categories of `category_type` visible to `user_id`,
    /// ordered by name.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_visible_by_type(
        &self,
        user_id: UserID,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, Error> {
        self.pool
            .get()?
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories
                 WHERE (user_id = :user_id OR is_default = 1) AND type = :type
                 ORDER BY name ASC"
            ))?
            .query_map(
                rusqlite::named_params! {
                    ":user_id": user_id.as_i64(),
                    ":type": category_type.as_str(),
                },
                Self::map_row,
            )?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    /// Replace the name, description, type and color of the category with
    /// `category_id` and return the updated row.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if there is no such
    /// category, or an [Error::SqlError] if there is some other SQL error.
    fn update(&self, category_id: DatabaseID, data: CategoryData) -> Result<Category, Error> {
        let connection = self.pool.get()?;
        let now = OffsetDateTime::now_utc();

        connection
            .prepare(&format!(
                "UPDATE categories
                 SET name = ?1, description = ?2, type = ?3, color = ?4, updated_at = ?5
                 WHERE id = ?6
                 RETURNING {CATEGORY_COLUMNS}"
            ))?
            .query_row(
                (
                    data.name.as_ref(),
                    &data.description,
                    data.category_type.as_str(),
                    data.color.as_ref(),
                    now,
                    category_id,
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    /// Remove the category with `category_id` from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no such category,
    /// - [Error::CategoryInUse] if a transaction still references the category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, category_id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .pool
            .get()?
            .execute("DELETE FROM categories WHERE id = ?1", (category_id,))
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                // Transactions restrict deletion of their category.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::CategoryInUse
                }
                error => error.into(),
            })?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Whether any transaction still references the category with `category_id`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn is_referenced(&self, category_id: DatabaseID) -> Result<bool, Error> {
        self.pool
            .get()?
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM transactions WHERE category_id = :id)",
                &[(":id", &category_id)],
                |row| row.get(0),
            )
            .map_err(|error| error.into())
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                color TEXT NOT NULL DEFAULT '#FF6B6B',
                user_id INTEGER,
                is_default INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;

        let raw_name: String = row.get(offset + 1)?;
        let name = CategoryName::new_unchecked(&raw_name);

        let description = row.get(offset + 2)?;

        let raw_type: String = row.get(offset + 3)?;
        let category_type = raw_type.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                rusqlite::types::Type::Text,
                format!("invalid category type {raw_type}").into(),
            )
        })?;

        let raw_color: String = row.get(offset + 4)?;
        let color = Color::new_unchecked(&raw_color);

        let user_id = row
            .get::<_, Option<i64>>(offset + 5)?
            .map(UserID::new);

        Ok(Category {
            id,
            name,
            description,
            category_type,
            color,
            user_id,
            is_default: row.get(offset + 6)?,
            created_at: row.get(offset + 7)?,
            updated_at: row.get(offset + 8)?,
        })
    }
}
