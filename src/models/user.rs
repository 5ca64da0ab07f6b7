//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::PasswordHash;

/// A newtype wrapper for integer user IDs.
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated username.
///
/// Usernames are 3-50 characters long and may only contain ASCII letters,
/// digits and underscores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create and validate a username.
    ///
    /// # Errors
    /// Returns a human-readable message describing the rule that was broken.
    pub fn new(name: &str) -> Result<Self, String> {
        if name.len() < 3 || name.len() > 50 {
            return Err("username must be between 3 and 50 characters".to_string());
        }

        if !name
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
        {
            return Err(
                "username may only contain letters, numbers and underscores".to_string(),
            );
        }

        Ok(Self(name.to_string()))
    }

    /// Create a username without validation.
    ///
    /// The caller should ensure that the string satisfies the username rules.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,
    /// The unique name the user signs in with.
    pub username: Username,
    /// The email address associated with the user.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's display name.
    pub full_name: String,
    /// When the user registered.
    pub created_at: OffsetDateTime,
    /// When the user record was last modified.
    pub updated_at: OffsetDateTime,
}

/// The data for creating a new user in the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The unique name the user signs in with.
    pub username: Username,
    /// The email address associated with the user.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's display name.
    pub full_name: String,
}
