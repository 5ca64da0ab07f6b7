//! This file defines the `Category` type and the types needed to create a category.
//! A category groups transactions and is either an income or an expense category.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{DatabaseID, UserID};

/// Whether a category groups income or expense transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err("type must be either INCOME or EXPENSE".to_string()),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error message if `name` is shorter than 2
    /// or longer than 100 characters.
    pub fn new(name: &str) -> Result<Self, String> {
        if name.len() < 2 || name.len() > 100 {
            Err("name must be between 2 and 100 characters".to_string())
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is between 2 and 100 characters.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the length invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex color string such as `#FF6B6B` used to display a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a color from a `#RRGGBB` string.
    ///
    /// Hex digits may be upper or lower case.
    ///
    /// # Errors
    /// This function will return an error message if the string is not a
    /// six-digit hex color with a leading `#`.
    pub fn new(color: &str) -> Result<Self, String> {
        let is_hex_color = color.len() == 7
            && color.starts_with('#')
            && color.chars().skip(1).all(|digit| digit.is_ascii_hexdigit());

        if is_hex_color {
            Ok(Self(color.to_string()))
        } else {
            Err("color must be a hex color such as #FF6B6B".to_string())
        }
    }

    /// Create a color without validation.
    ///
    /// The caller should ensure that the string is a six-digit hex color with a leading `#`.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the format invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self("#FF6B6B".to_string())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for income or expense transactions, e.g., 'Groceries', 'Wages'.
///
/// Categories with `is_default` set and no owner are seeded by the system,
/// visible to every user and immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DatabaseID,
    pub name: CategoryName,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: Color,
    pub user_id: Option<UserID>,
    pub is_default: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Category {
    /// Whether `user_id` may attach transactions to this category.
    ///
    /// A category is visible to its owner and default categories are visible
    /// to everyone.
    pub fn is_visible_to(&self, user_id: UserID) -> bool {
        self.is_default || self.user_id == Some(user_id)
    }
}



#[cfg(test)]
mod color_tests {
    use crate::models::Color;

    #[test]
    fn new_accepts_hex_colors_in_either_case() {
        for raw in ["#FF6B6B", "#ff6b6b", "#AbCdEf"] {
            assert!(Color::new(raw).is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn new_rejects_malformed_colors() {
        for raw in ["FF6B6B", "#FF6B6", "#FF6B6B7", "#GG6B6B", ""] {
            assert!(Color::new(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn default_color_is_the_fixed_swatch() {
        assert_eq!(Color::default().as_ref(), "#FF6B6B");
    }
}
