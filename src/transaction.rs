//! The route handlers for creating, listing, updating and deleting
//! transactions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error, FieldError,
    auth::AuthUser,
    models::{DatabaseID, TransactionType, TransactionView, UserID},
    pagination::PageQuery,
    stores::{CategoryStore, TransactionData, TransactionQuery, TransactionStore},
};

/// The request body for creating or updating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
    /// The date when the transaction occurred, as `YYYY-MM-DD`.
    pub date: String,
    /// Whether the transaction records income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: i64,
    /// Optional free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionPayload {
    /// Check every field and collect the rules that were broken.
    fn validate(self) -> Result<TransactionData, Error> {
        let mut details = Vec::new();

        if self.amount <= 0.0 {
            details.push(FieldError::new("amount", "amount must be greater than 0"));
        } else if (self.amount * 100.0 - (self.amount * 100.0).round()).abs() > 1e-6 {
            details.push(FieldError::new(
                "amount",
                "amount must have at most 2 decimal places",
            ));
        }

        if self.description.len() < 2 || self.description.len() > 255 {
            details.push(FieldError::new(
                "description",
                "description must be between 2 and 255 characters",
            ));
        }

        let date = match parse_date(&self.date, "date") {
            Ok(date) => Some(date),
            Err(field_error) => {
                details.push(field_error);
                None
            }
        };

        let transaction_type = match self.transaction_type.parse::<TransactionType>() {
            Ok(transaction_type) => Some(transaction_type),
            Err(message) => {
                details.push(FieldError::new("type", message));
                None
            }
        };

        if self.category_id <= 0 {
            details.push(FieldError::new(
                "categoryId",
                "categoryId must be a positive integer",
            ));
        }

        if let Some(notes) = &self.notes
            && notes.len() > 500
        {
            details.push(FieldError::new("notes", "notes must be at most 500 characters"));
        }

        match (date, transaction_type) {
            (Some(date), Some(transaction_type)) if details.is_empty() => Ok(TransactionData {
                amount: self.amount,
                description: self.description,
                date,
                transaction_type,
                category_id: self.category_id,
                notes: self.notes,
            }),
            _ => Err(Error::Validation(details)),
        }
    }
}

/// Parse a `YYYY-MM-DD` string into a [Date], or describe the failure for the
/// field `field`.
fn parse_date(raw_date: &str, field: &str) -> Result<Date, FieldError> {
    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| FieldError::new(field, "must be a valid date in the format YYYY-MM-DD"))
}

/// Reject month numbers outside 1-12.
pub(crate) fn validate_month(month: u8) -> Result<(), Error> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::Validation(vec![FieldError::new(
            "month",
            "month must be between 1 and 12",
        )]))
    }
}

/// Check that the requester may attach transactions to the category:
/// it must exist and be either owned by them or a system default.
///
/// Both failure modes produce the same error so that category IDs cannot be
/// probed across users.
fn check_category_visible(
    state: &AppState,
    category_id: DatabaseID,
    user_id: UserID,
) -> Result<(), Error> {
    let category = state
        .category_store
        .get(category_id)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })?;

    if category.is_visible_to(user_id) {
        Ok(())
    } else {
        Err(Error::InvalidCategory)
    }
}

/// A route handler for listing the requester's transactions, most recent
/// first.
///
/// Supplying both `page` and `size` query parameters selects a single page of
/// results; otherwise the full set is returned.
pub async fn get_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let query = TransactionQuery {
        limit_offset: page_query.to_limit_offset()?,
        ..Default::default()
    };

    state.transaction_store.get_query(user.id, query).map(Json)
}

/// The query parameters for [get_transactions_by_date_range].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    /// The first date to include, as `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// The last date to include, as `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A route handler for listing the requester's transactions within an
/// inclusive date range.
///
/// # Errors
/// This function will return an [Error::Validation] if either bound is
/// missing or not a valid date.
pub async fn get_transactions_by_date_range(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let mut details = Vec::new();

    let start_date = match &params.start_date {
        Some(raw_date) => parse_date(raw_date, "startDate")
            .map_err(|field_error| details.push(field_error))
            .ok(),
        None => {
            details.push(FieldError::new("startDate", "startDate is required"));
            None
        }
    };

    let end_date = match &params.end_date {
        Some(raw_date) => parse_date(raw_date, "endDate")
            .map_err(|field_error| details.push(field_error))
            .ok(),
        None => {
            details.push(FieldError::new("endDate", "endDate is required"));
            None
        }
    };

    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        return Err(Error::Validation(details));
    };

    let query = TransactionQuery {
        date_range: Some(start_date..=end_date),
        ..Default::default()
    };

    state.transaction_store.get_query(user.id, query).map(Json)
}

/// A route handler for listing the requester's transactions of one type.
///
/// # Errors
/// This function will return an [Error::Validation] if `transaction_type` is
/// not INCOME or EXPENSE.
pub async fn get_transactions_by_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(transaction_type): Path<String>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let transaction_type = transaction_type
        .parse::<TransactionType>()
        .map_err(|message| Error::Validation(vec![FieldError::new("type", message)]))?;

    let query = TransactionQuery {
        transaction_type: Some(transaction_type),
        ..Default::default()
    };

    state.transaction_store.get_query(user.id, query).map(Json)
}

/// A route handler for listing the requester's transactions within one
/// calendar month.
///
/// # Errors
/// This function will return an [Error::Validation] if the month is not in
/// 1-12.
pub async fn get_transactions_by_month(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    validate_month(month)?;

    let query = TransactionQuery {
        month: Some((year, month)),
        ..Default::default()
    };

    state.transaction_store.get_query(user.id, query).map(Json)
}

/// A route handler for creating a new transaction owned by the requester.
///
/// The stored row is re-read joined with its category before being returned,
/// so the response always carries the embedded category fields.
///
/// # Errors
/// This function will return an [Error::Validation] if any field fails
/// validation, or an [Error::InvalidCategory] if the category does not exist
/// or is not visible to the requester.
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TransactionPayload>,
) -> Result<impl IntoResponse, Error> {
    let data = payload.validate()?;
    check_category_visible(&state, data.category_id, user.id)?;

    let transaction = state.transaction_store.create(data, user.id)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for fetching a single transaction owned by the requester.
///
/// # Errors
/// This function will return an [Error::NotFound] if no transaction matches
/// both the ID and the requester.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<TransactionView>, Error> {
    state.transaction_store.get(transaction_id, user.id).map(Json)
}

/// A route handler for replacing the data of a transaction owned by the
/// requester.
///
/// # Errors
/// This function will return an [Error::NotFound] if no transaction matches
/// both the ID and the requester, and otherwise validates exactly as
/// [create_transaction].
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(transaction_id): Path<DatabaseID>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<TransactionView>, Error> {
    state.transaction_store.get(transaction_id, user.id)?;

    let data = payload.validate()?;
    check_category_visible(&state, data.category_id, user.id)?;

    state
        .transaction_store
        .update(transaction_id, data, user.id)
        .map(Json)
}

/// A route handler for deleting a transaction owned by the requester.
///
/// # Errors
/// This function will return an [Error::NotFound] if no transaction matches
/// both the ID and the requester.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error> {
    state.transaction_store.delete(transaction_id, user.id)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_user_and_log_in, new_test_server},
    };

    async fn create_category(server: &TestServer, token: &str, name: &str) -> i64 {
        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": name, "type": "EXPENSE" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    fn transaction_payload(category_id: i64, date: &str, amount: f64) -> Value {
        json!({
            "amount": amount,
            "description": "A thingymajig",
            "date": date,
            "type": "EXPENSE",
            "categoryId": category_id,
        })
    }

    async fn create_transaction(
        server: &TestServer,
        token: &str,
        category_id: i64,
        date: &str,
        amount: f64,
    ) -> Value {
        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .json(&transaction_payload(category_id, date, amount))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn create_and_fetch_transaction_round_trips() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;

        let created = create_transaction(&server, &token, category_id, "2025-06-15", 12.50).await;

        assert_eq!(created["amount"], json!(12.5));
        assert_eq!(created["date"], "2025-06-15");
        assert_eq!(created["category"]["name"], "Groceries");
        assert_eq!(created["notes"], Value::Null);

        let response = server
            .get(&format_endpoint(
                endpoints::TRANSACTION,
                created["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), created);
    }

    #[tokio::test]
    async fn create_transaction_rejects_invalid_fields() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .json(&json!({
                "amount": -1.0,
                "description": "x",
                "date": "June 15th",
                "type": "TRANSFER",
                "categoryId": 0,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|detail| detail["field"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec!["amount", "description", "date", "type", "categoryId"]
        );
    }

    #[tokio::test]
    async fn create_transaction_rejects_fractional_cents() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .json(&transaction_payload(category_id, "2025-06-15", 1.005))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_transaction_rejects_other_users_category() {
        let server = new_test_server();
        let owner_token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &owner_token, "Groceries").await;

        let other_token = create_user_and_log_in(&server, "bar", "bar@baz.qux").await;
        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&other_token)
            .json(&transaction_payload(category_id, "2025-06-15", 12.50))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid category" }));

        // A nonexistent category produces the same response.
        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&other_token)
            .json(&transaction_payload(13_337, "2025-06-15", 12.50))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid category" }));
    }

    #[tokio::test]
    async fn create_transaction_accepts_default_category() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let categories = server
            .get(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        let default_category_id = categories[0]["id"].as_i64().unwrap();

        create_transaction(&server, &token, default_category_id, "2025-06-15", 12.50).await;
    }

    #[tokio::test]
    async fn pagination_returns_the_requested_page() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;

        // 25 transactions on distinct dates so the ranking is unambiguous.
        for day in 1..=25 {
            create_transaction(
                &server,
                &token,
                category_id,
                &format!("2025-06-{day:02}"),
                f64::from(day),
            )
            .await;
        }

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", 2)
            .add_query_param("size", 10)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let transactions = response.json::<Vec<Value>>();
        let dates: Vec<&str> = transactions
            .iter()
            .map(|transaction| transaction["date"].as_str().unwrap())
            .collect();
        let expected_dates: Vec<String> =
            (6..=15).rev().map(|day| format!("2025-06-{day:02}")).collect();
        assert_eq!(dates, expected_dates);
    }

    #[tokio::test]
    async fn list_without_pagination_returns_everything() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;
        for day in 1..=3 {
            create_transaction(
                &server,
                &token,
                category_id,
                &format!("2025-06-{day:02}"),
                1.0,
            )
            .await;
        }

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Value>>().len(), 3);
    }

    #[tokio::test]
    async fn date_range_requires_both_bounds() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .get(endpoints::TRANSACTIONS_DATE_RANGE)
            .add_query_param("startDate", "2025-06-01")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["details"][0]["field"], "endDate");
    }

    #[tokio::test]
    async fn date_range_filters_inclusively() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;
        for day in 1..=5 {
            create_transaction(
                &server,
                &token,
                category_id,
                &format!("2025-06-{day:02}"),
                1.0,
            )
            .await;
        }

        let response = server
            .get(endpoints::TRANSACTIONS_DATE_RANGE)
            .add_query_param("startDate", "2025-06-02")
            .add_query_param("endDate", "2025-06-04")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let transactions = response.json::<Vec<Value>>();
        let dates: Vec<&str> = transactions
            .iter()
            .map(|transaction| transaction["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2025-06-04", "2025-06-03", "2025-06-02"]);
    }

    #[tokio::test]
    async fn type_listing_filters_and_validates() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;
        create_transaction(&server, &token, category_id, "2025-06-01", 10.0).await;

        let mut income_payload = transaction_payload(category_id, "2025-06-02", 20.0);
        income_payload["type"] = json!("INCOME");
        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&income_payload)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/transactions/type/INCOME")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();

        let transactions = response.json::<Vec<Value>>();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["type"], "INCOME");

        server
            .get("/api/transactions/type/TRANSFER")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn monthly_listing_validates_the_month() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        server
            .get("/api/transactions/monthly/2025/13")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .get("/api/transactions/monthly/2025/6")
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn update_transaction_replaces_all_fields() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;
        let other_category_id = create_category(&server, &token, "Eating Out").await;
        let created = create_transaction(&server, &token, category_id, "2025-06-15", 12.50).await;

        let response = server
            .put(&format_endpoint(
                endpoints::TRANSACTION,
                created["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 99.99,
                "description": "Fancy dinner",
                "date": "2025-06-16",
                "type": "EXPENSE",
                "categoryId": other_category_id,
                "notes": "birthday",
            }))
            .await;

        response.assert_status_ok();

        let updated = response.json::<Value>();
        assert_eq!(updated["amount"], json!(99.99));
        assert_eq!(updated["category"]["name"], "Eating Out");
        assert_eq!(updated["notes"], "birthday");
    }

    #[tokio::test]
    async fn transactions_are_scoped_to_their_owner() {
        let server = new_test_server();
        let owner_token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &owner_token, "Groceries").await;
        let created =
            create_transaction(&server, &owner_token, category_id, "2025-06-15", 12.50).await;
        let transaction_path =
            format_endpoint(endpoints::TRANSACTION, created["id"].as_i64().unwrap());

        let other_token = create_user_and_log_in(&server, "bar", "bar@baz.qux").await;

        server
            .get(&transaction_path)
            .authorization_bearer(&other_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .delete(&transaction_path)
            .authorization_bearer(&other_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_transaction_removes_it() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category_id = create_category(&server, &token, "Groceries").await;
        let created = create_transaction(&server, &token, category_id, "2025-06-15", 12.50).await;
        let transaction_path =
            format_endpoint(endpoints::TRANSACTION, created["id"].as_i64().unwrap());

        let response = server
            .delete(&transaction_path)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Transaction deleted successfully" }));

        server
            .get(&transaction_path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
