//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    models::{DatabaseID, TransactionType, TransactionView, UserID},
};

/// The validated data for creating or replacing a transaction.
#[derive(Debug, Clone)]
pub struct TransactionData {
    /// The value of the transaction, always positive.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
    /// The date the transaction occurred.
    pub date: Date,
    /// Whether the transaction records income or an expense.
    pub transaction_type: TransactionType,
    /// The category the transaction belongs to.
    pub category_id: DatabaseID,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
///
/// All filters apply on top of the mandatory owner filter, and results are
/// always ordered by date descending, then creation time descending.
#[derive(Debug, Default)]
pub struct TransactionQuery {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Include only transactions within the calendar month `(year, month)`.
    pub month: Option<(i32, u8)>,
    /// Selects up to `limit` transactions after skipping `offset`.
    pub limit_offset: Option<(u64, u64)>,
}

/// The income, expense and balance totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The sum of all INCOME transaction amounts in the month.
    pub income: f64,
    /// The sum of all EXPENSE transaction amounts in the month.
    pub expense: f64,
    /// `income - expense`.
    pub balance: f64,
}

/// Handles the creation and retrieval of transactions.
///
/// Every method that returns transactions serves them joined with their
/// category's name, type and color.
pub trait TransactionStore {
    /// Create a new transaction owned by `user_id` and return it joined with
    /// its category.
    fn create(&self, data: TransactionData, user_id: UserID) -> Result<TransactionView, Error>;

    /// Retrieve the transaction with `id` owned by `user_id`.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<TransactionView, Error>;

    /// Retrieve the transactions owned by `user_id` in the way defined by `query`.
    fn get_query(
        &self,
        user_id: UserID,
        query: TransactionQuery,
    ) -> Result<Vec<TransactionView>, Error>;

    /// Replace the data of the transaction with `id` owned by `user_id`.
    fn update(
        &self,
        id: DatabaseID,
        data: TransactionData,
        user_id: UserID,
    ) -> Result<TransactionView, Error>;

    /// Remove the transaction with `id` owned by `user_id` from the store.
    fn delete(&self, id: DatabaseID, user_id: UserID) -> Result<(), Error>;

    /// Compute the income/expense/balance totals for `user_id` over one
    /// calendar month.
    fn monthly_summary(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<MonthlySummary, Error>;
}
