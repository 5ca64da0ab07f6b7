//! Fintrack is a personal finance tracker.
//!
//! This library provides a JSON REST API for managing transactions and
//! categories, with bearer-token authentication and monthly
//! income/expense summaries.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod config;
mod db;
mod endpoints;
mod logging;
mod models;
mod pagination;
mod routing;
mod stores;
mod summary;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use app_state::AppState;
pub use config::Config;
pub use db::{DbPool, create_pool, initialize};
pub use logging::logging_middleware;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// A single field that failed validation, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// The JSON field name the message refers to.
    pub field: String,
    /// A human-readable description of the rule that was broken.
    pub message: String,
}

impl FieldError {
    /// Create a field error for `field`.
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username was unknown or the password did not match.
    ///
    /// The two cases are deliberately indistinguishable so that a client
    /// cannot probe which usernames are registered.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request had no parseable `Authorization: Bearer` header.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token was malformed or its signature did not verify.
    #[error("the token is invalid")]
    InvalidToken,

    /// The bearer token was past its expiration time.
    #[error("the token has expired")]
    ExpiredToken,

    /// The token verified but its subject no longer exists in the database.
    #[error("the token's user no longer exists")]
    UserNoLongerExists,

    /// One or more request fields failed validation.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The referenced category does not exist or belongs to another user.
    ///
    /// The same error is returned in both cases so that a client cannot probe
    /// which category IDs exist.
    #[error("the category does not exist or is not visible to this user")]
    InvalidCategory,

    /// A default category was the target of an update or delete.
    #[error("default categories cannot be modified")]
    DefaultCategoryImmutable,

    /// The category belongs to another user.
    #[error("the category belongs to another user")]
    NotCategoryOwner,

    /// The category still has transactions referencing it.
    #[error("the category has transactions and cannot be deleted")]
    CategoryInUse,

    /// The username is already registered.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The email address is already registered.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// A connection could not be checked out of the database pool.
    #[error("could not acquire a database connection: {0}")]
    PoolError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("users.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("users.email") =>
            {
                Error::DuplicateEmail
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<r2d2::Error> for Error {
    fn from(value: r2d2::Error) -> Self {
        tracing::error!("could not acquire a database connection: {}", value);
        Error::PoolError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid username or password" }),
            ),
            Error::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Missing authorization token" }),
            ),
            Error::UserNoLongerExists => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "User not found" }),
            ),
            Error::InvalidToken => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Invalid authorization token" }),
            ),
            Error::ExpiredToken => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Token has expired" }),
            ),
            Error::DefaultCategoryImmutable => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Default categories cannot be modified" }),
            ),
            Error::NotCategoryOwner => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Access to this category is not allowed" }),
            ),
            Error::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            Error::InvalidCategory => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid category" }),
            ),
            Error::CategoryInUse => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Cannot delete a category that has transactions" }),
            ),
            Error::DuplicateUsername => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Username already exists" }),
            ),
            Error::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Email already exists" }),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "The requested resource could not be found" }),
            ),
            error => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Internal server error: {error}") }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
