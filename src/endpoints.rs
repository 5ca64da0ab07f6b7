//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}',
//! use [format_endpoint].

/// The liveness probe.
pub const HEALTH: &str = "/api/health";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for signing in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for re-validating a bearer token.
pub const VALIDATE: &str = "/api/auth/validate";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to list the categories of one type.
pub const CATEGORIES_BY_TYPE: &str = "/api/categories/type/{category_type}";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to list the transactions within a date range.
pub const TRANSACTIONS_DATE_RANGE: &str = "/api/transactions/date-range";
/// The route to list the transactions of one type.
pub const TRANSACTIONS_BY_TYPE: &str = "/api/transactions/type/{transaction_type}";
/// The route to list the transactions of one calendar month.
pub const TRANSACTIONS_MONTHLY: &str = "/api/transactions/monthly/{year}/{month}";
/// The route for the current month's income/expense/balance totals.
pub const SUMMARY: &str = "/api/transactions/summary";
/// The route for a specific month's income/expense/balance totals.
pub const SUMMARY_MONTHLY: &str = "/api/transactions/summary/{year}/{month}";
/// The route to fetch, update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the part of the path between a left and a right brace, for
/// example `{category_id}` in '/api/categories/{category_id}'. If no
/// parameter is found, the original `endpoint_path` is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    match (endpoint_path.find('{'), endpoint_path.find('}')) {
        (Some(start), Some(end)) if start < end => {
            format!("{}{}{}", &endpoint_path[..start], id, &endpoint_path[end + 1..])
        }
        _ => endpoint_path.to_owned(),
    }
}
