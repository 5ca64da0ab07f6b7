//! The domain models for the application.

mod category;
mod password;
mod transaction;
mod user;

pub use category::{Category, CategoryName, CategoryType, Color};
pub use password::PasswordHash;
pub use transaction::{CategoryRef, TransactionType, TransactionView};
pub use user::{NewUser, User, UserID, Username};

/// Alias for integer IDs used in the application's database.
///
/// This type helps distinguish ints used for database IDs from general purpose ints.
pub type DatabaseID = i64;
