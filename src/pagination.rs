//! This module defines the common functionality for paging data.

use serde::Deserialize;

use crate::{Error, FieldError};

/// The optional pagination query parameters accepted by list endpoints.
///
/// Pagination only applies when both parameters are present; otherwise the
/// full result set is returned. Pages are 1-based.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of items per page.
    pub size: Option<u64>,
}

impl PageQuery {
    /// Convert the query into a `(limit, offset)` pair, or `None` when either
    /// parameter is missing.
    ///
    /// # Errors
    /// This function will return an [Error::Validation] if either parameter
    /// is zero.
    pub fn to_limit_offset(&self) -> Result<Option<(u64, u64)>, Error> {
        let (Some(page), Some(size)) = (self.page, self.size) else {
            return Ok(None);
        };

        let mut details = Vec::new();
        if page == 0 {
            details.push(FieldError::new("page", "page must be at least 1"));
        }
        if size == 0 {
            details.push(FieldError::new("size", "size must be at least 1"));
        }

        if details.is_empty() {
            Ok(Some((size, (page - 1) * size)))
        } else {
            Err(Error::Validation(details))
        }
    }
}

#[cfg(test)]
mod page_query_tests {
    use super::PageQuery;

    #[test]
    fn missing_parameters_disable_pagination() {
        for (page, size) in [(None, None), (Some(2), None), (None, Some(10))] {
            let query = PageQuery { page, size };

            assert_eq!(query.to_limit_offset().unwrap(), None);
        }
    }

    #[test]
    fn first_page_starts_at_offset_zero() {
        let query = PageQuery {
            page: Some(1),
            size: Some(10),
        };

        assert_eq!(query.to_limit_offset().unwrap(), Some((10, 0)));
    }

    #[test]
    fn later_pages_skip_preceding_items() {
        let query = PageQuery {
            page: Some(3),
            size: Some(25),
        };

        assert_eq!(query.to_limit_offset().unwrap(), Some((25, 50)));
    }

    #[test]
    fn zero_page_or_size_is_rejected() {
        for (page, size) in [(Some(0), Some(10)), (Some(1), Some(0))] {
            let query = PageQuery { page, size };

            assert!(query.to_limit_offset().is_err());
        }
    }
}
