//! Implements a struct that holds the state of the REST server.

use time::Duration;

use crate::{
    auth::JwtKeys,
    db::DbPool,
    stores::sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The store for managing [users](crate::models::User).
    pub user_store: SQLiteUserStore,

    /// The store for managing [categories](crate::models::Category).
    pub category_store: SQLiteCategoryStore,

    /// The store for managing [transactions](crate::models::TransactionView).
    pub transaction_store: SQLiteTransactionStore,

    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// The duration for which issued bearer tokens are valid.
    pub token_duration: Duration,
}

impl AppState {
    /// Create a new [AppState] with a SQLite connection pool.
    ///
    /// `jwt_secret` is the server-held secret used to sign bearer tokens, and
    /// `token_duration` is how long issued tokens stay valid.
    pub fn new(pool: DbPool, jwt_secret: &str, token_duration: Duration) -> Self {
        Self {
            user_store: SQLiteUserStore::new(pool.clone()),
            category_store: SQLiteCategoryStore::new(pool.clone()),
            transaction_store: SQLiteTransactionStore::new(pool),
            jwt_keys: JwtKeys::new(jwt_secret),
            token_duration,
        }
    }
}
