//! Defines the user store trait.

use crate::{
    Error,
    models::{NewUser, User, UserID},
};

/// Creates and retrieves application users.
pub trait UserStore {
    /// Create a new user and add it to the store.
    fn create(&self, new_user: NewUser) -> Result<User, Error>;

    /// Get a user by their ID.
    fn get(&self, user_id: UserID) -> Result<User, Error>;

    /// Get a user by their username.
    fn get_by_username(&self, username: &str) -> Result<User, Error>;
}
