//! Implements a SQLite backed transaction store.
//!
//! Every read joins the category table so that the API layer never sees the
//! bare category foreign key.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, DbPool, MapRow},
    models::{CategoryRef, Color, DatabaseID, TransactionView, UserID},
    stores::{MonthlySummary, TransactionData, TransactionQuery, TransactionStore},
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction depends on the [User](crate::models::User)
/// and [Category](crate::models::Category) models, these models must be set up
/// in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    pool: DbPool,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite connection `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Retrieve a transaction joined with its category on an already acquired
    /// connection.
    fn get_with_connection(
        connection: &Connection,
        id: DatabaseID,
        user_id: UserID,
    ) -> Result<TransactionView, Error> {
        connection
            .prepare(&format!(
                "{JOINED_SELECT} WHERE t.id = :id AND t.user_id = :user_id"
            ))?
            .query_row(
                rusqlite::named_params! { ":id": id, ":user_id": user_id.as_i64() },
                Self::map_row,
            )
            .map_err(|error| error.into())
    }
}

const JOINED_SELECT: &str = "SELECT t.id, t.amount, t.description, t.date, t.type, t.user_id, t.notes, t.created_at, t.updated_at,
            c.id, c.name, c.type, c.color
     FROM transactions t
     INNER JOIN categories c ON c.id = t.category_id";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database and return it joined with its
    /// category fields.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidCategory] if `category_id`
    /// does not refer to a valid category, or an [Error::SqlError] if there is
    /// some other SQL error.
    fn create(&self, data: TransactionData, user_id: UserID) -> Result<TransactionView, Error> {
        let connection = self.pool.get()?;
        let now = OffsetDateTime::now_utc();

        connection.execute(
            "INSERT INTO transactions (amount, description, date, type, category_id, user_id, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            (
                data.amount,
                &data.description,
                data.date,
                data.transaction_type.as_str(),
                data.category_id,
                user_id.as_i64(),
                &data.notes,
                now,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Self::get_with_connection(&connection, id, user_id)
    }

    /// Retrieve the transaction with `id` owned by `user_id`.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if no transaction
    /// matches both the ID and the owner, or an [Error::SqlError] if there is
    /// some other SQL error.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<TransactionView, Error> {
        let connection = self.pool.get()?;

        Self::get_with_connection(&connection, id, user_id)
    }

    /// Query for the transactions owned by `user_id`.
    ///
    /// Results are ordered by transaction date descending, then creation time
    /// descending.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_query(
        &self,
        user_id: UserID,
        query: TransactionQuery,
    ) -> Result<Vec<TransactionView>, Error> {
        let mut query_string_parts = vec![JOINED_SELECT.to_string()];
        let mut where_clause_parts = vec!["t.user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

        if let Some(date_range) = query.date_range {
            where_clause_parts.push(format!(
                "t.date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_range.start().to_string()));
            query_parameters.push(Value::Text(date_range.end().to_string()));
        }

        if let Some(transaction_type) = query.transaction_type {
            where_clause_parts.push(format!("t.type = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
        }

        if let Some((year, month)) = query.month {
            where_clause_parts.push(format!(
                "strftime('%Y', t.date) = ?{} AND strftime('%m', t.date) = ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(format!("{year:04}")));
            query_parameters.push(Value::Text(format!("{month:02}")));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        query_string_parts.push("ORDER BY t.date DESC, t.created_at DESC, t.id DESC".to_string());

        if let Some((limit, offset)) = query.limit_offset {
            query_string_parts.push(format!("LIMIT {limit} OFFSET {offset}"));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.pool
            .get()?
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Replace the data of the transaction with `id` owned by `user_id` and
    /// return the refreshed row joined with its category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no transaction matches both the ID and the owner,
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &self,
        id: DatabaseID,
        data: TransactionData,
        user_id: UserID,
    ) -> Result<TransactionView, Error> {
        let connection = self.pool.get()?;
        let now = OffsetDateTime::now_utc();

        let rows_updated = connection.execute(
            "UPDATE transactions
             SET amount = ?1, description = ?2, date = ?3, type = ?4, category_id = ?5, notes = ?6, updated_at = ?7
             WHERE id = ?8 AND user_id = ?9",
            (
                data.amount,
                &data.description,
                data.date,
                data.transaction_type.as_str(),
                data.category_id,
                &data.notes,
                now,
                id,
                user_id.as_i64(),
            ),
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Self::get_with_connection(&connection, id, user_id)
    }

    /// Remove the transaction with `id` owned by `user_id` from the database.
    ///
    /// # Errors
    /// This function will return an [Error::NotFound] if no transaction
    /// matches both the ID and the owner, or an [Error::SqlError] if there is
    /// some other SQL error.
    fn delete(&self, id: DatabaseID, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self.pool.get()?.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Compute the income/expense/balance totals for `user_id` over the
    /// calendar month `(year, month)`.
    ///
    /// Months without transactions yield all-zero totals.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn monthly_summary(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<MonthlySummary, Error> {
        let (income, expense) = self.pool.get()?.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'INCOME' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'EXPENSE' THEN amount ELSE 0 END), 0)
             FROM transactions
             WHERE user_id = :user_id
               AND strftime('%Y', date) = :year
               AND strftime('%m', date) = :month",
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":year": format!("{year:04}"),
                ":month": format!("{month:02}"),
            },
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)),
        )?;

        Ok(MonthlySummary {
            income,
            expense,
            balance: income - expense,
        })
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES categories(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = TransactionView;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_type: String = row.get(offset + 4)?;
        let transaction_type = raw_type.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                rusqlite::types::Type::Text,
                format!("invalid transaction type {raw_type}").into(),
            )
        })?;

        let raw_category_type: String = row.get(offset + 11)?;
        let category_type = raw_category_type.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 11,
                rusqlite::types::Type::Text,
                format!("invalid category type {raw_category_type}").into(),
            )
        })?;

        let raw_color: String = row.get(offset + 12)?;
        let category = CategoryRef {
            id: row.get(offset + 9)?,
            name: row.get(offset + 10)?,
            category_type,
            color: Color::new_unchecked(&raw_color),
        };

        Ok(TransactionView {
            id: row.get(offset)?,
            amount: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            date: row.get(offset + 3)?,
            transaction_type,
            category,
            user_id: UserID::new(row.get(offset + 5)?),
            notes: row.get(offset + 6)?,
            created_at: row.get(offset + 7)?,
            updated_at: row.get(offset + 8)?,
        })
    }
}
