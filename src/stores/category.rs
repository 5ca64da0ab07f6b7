//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryName, CategoryType, Color, DatabaseID, UserID},
};

/// The validated data for creating or replacing a category.
#[derive(Debug, Clone)]
pub struct CategoryData {
    /// The display name of the category.
    pub name: CategoryName,
    /// An optional longer description.
    pub description: Option<String>,
    /// Whether the category groups income or expenses.
    pub category_type: CategoryType,
    /// The display color.
    pub color: Color,
}

/// Creates and retrieves transaction categories.
pub trait CategoryStore {
    /// Create a new user-owned category and add it to the store.
    fn create(&self, data: CategoryData, user_id: UserID) -> Result<Category, Error>;

    /// Get a category by its ID.
    fn get(&self, category_id: DatabaseID) -> Result<Category, Error>;

    /// Get all categories visible to a user (their own plus the defaults),
    /// ordered by name.
    fn get_visible(&self, user_id: UserID) -> Result<Vec<Category>, Error>;

    /// Get the categories of one type visible to a user, ordered by name.
    fn get_visible_by_type(
        &self,
        user_id: UserID,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, Error>;

    /// Replace the name, description, type and color of a category.
    fn update(&self, category_id: DatabaseID, data: CategoryData) -> Result<Category, Error>;

    /// Remove a category from the store.
    fn delete(&self, category_id: DatabaseID) -> Result<(), Error>;

    /// Whether any transaction still references the category.
    fn is_referenced(&self, category_id: DatabaseID) -> Result<bool, Error>;
}
