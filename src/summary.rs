//! The route handlers for monthly income/expense/balance summaries.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::AuthUser,
    stores::{MonthlySummary, TransactionStore},
    transaction::validate_month,
};

/// A route handler for the requester's income/expense/balance totals over the
/// current calendar month.
pub async fn get_current_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MonthlySummary>, Error> {
    let today = OffsetDateTime::now_utc().date();

    state
        .transaction_store
        .monthly_summary(user.id, today.year(), u8::from(today.month()))
        .map(Json)
}

/// A route handler for the requester's income/expense/balance totals over a
/// specific calendar month.
///
/// # Errors
/// This function will return an [Error::Validation] if the month is not in
/// 1-12.
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<MonthlySummary>, Error> {
    validate_month(month)?;

    state
        .transaction_store
        .monthly_summary(user.id, year, month)
        .map(Json)
}
