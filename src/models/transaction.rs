//! This file defines the types that represent transactions at the API boundary.
//!
//! Transactions are stored with a bare category foreign key, but are always
//! served with the joined category fields embedded, so the row shape never
//! leaks out of the store layer.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::models::{CategoryType, Color, DatabaseID, UserID};

/// Whether a transaction records income or an expense.
///
/// This is tracked separately from the type of the linked category and the two
/// are not cross-checked: a transaction may carry an INCOME type while
/// referencing an EXPENSE category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err("type must be either INCOME or EXPENSE".to_string()),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The category fields embedded in every transaction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: DatabaseID,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: Color,
}

/// A transaction joined with the name, type and color of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: DatabaseID,
    pub amount: f64,
    pub description: String,
    pub date: Date,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: CategoryRef,
    pub user_id: UserID,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
