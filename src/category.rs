//! The route handlers for creating, listing, updating and deleting categories.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, FieldError,
    auth::AuthUser,
    models::{Category, CategoryName, CategoryType, Color, DatabaseID},
    stores::{CategoryData, CategoryStore},
};

/// The request body for creating or updating a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    /// The display name of the category.
    pub name: String,
    /// An optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub category_type: String,
    /// The display color. Defaults to the fixed swatch on create and to the
    /// current value on update.
    #[serde(default)]
    pub color: Option<String>,
}

impl CategoryPayload {
    /// Check every field and collect the rules that were broken.
    ///
    /// `fallback_color` is used when the payload does not carry a color.
    fn validate(self, fallback_color: Color) -> Result<CategoryData, Error> {
        let mut details = Vec::new();

        let name = match CategoryName::new(&self.name) {
            Ok(name) => Some(name),
            Err(message) => {
                details.push(FieldError::new("name", message));
                None
            }
        };

        if let Some(description) = &self.description
            && description.len() > 255
        {
            details.push(FieldError::new(
                "description",
                "description must be at most 255 characters",
            ));
        }

        let category_type = match self.category_type.parse::<CategoryType>() {
            Ok(category_type) => Some(category_type),
            Err(message) => {
                details.push(FieldError::new("type", message));
                None
            }
        };

        let color = match &self.color {
            Some(raw_color) => match Color::new(raw_color) {
                Ok(color) => Some(color),
                Err(message) => {
                    details.push(FieldError::new("color", message));
                    None
                }
            },
            None => Some(fallback_color),
        };

        match (name, category_type, color) {
            (Some(name), Some(category_type), Some(color)) if details.is_empty() => {
                Ok(CategoryData {
                    name,
                    description: self.description,
                    category_type,
                    color,
                })
            }
            _ => Err(Error::Validation(details)),
        }
    }
}

/// A route handler for listing the categories visible to the requester: their
/// own categories and the system defaults, ordered by name.
pub async fn get_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Category>>, Error> {
    state.category_store.get_visible(user.id).map(Json)
}

/// A route handler for listing the visible categories of one type.
///
/// # Errors
/// This function will return an [Error::Validation] if `category_type` is not
/// INCOME or EXPENSE.
pub async fn get_categories_by_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_type): Path<String>,
) -> Result<Json<Vec<Category>>, Error> {
    let category_type = category_type
        .parse::<CategoryType>()
        .map_err(|message| Error::Validation(vec![FieldError::new("type", message)]))?;

    state
        .category_store
        .get_visible_by_type(user.id, category_type)
        .map(Json)
}

/// A route handler for creating a new category owned by the requester.
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, Error> {
    let data = payload.validate(Color::default())?;

    let category = state.category_store.create(data, user.id)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Check that `user` may modify the category: default categories and other
/// users' categories are off limits.
fn check_ownership(category: &Category, user: &AuthUser) -> Result<(), Error> {
    if category.is_default {
        return Err(Error::DefaultCategoryImmutable);
    }

    if category.user_id != Some(user.id) {
        return Err(Error::NotCategoryOwner);
    }

    Ok(())
}

/// A route handler for updating a category owned by the requester.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no category has `category_id`,
/// - [Error::DefaultCategoryImmutable] if the category is a system default,
/// - [Error::NotCategoryOwner] if the category belongs to another user,
/// - or [Error::Validation] if any field fails validation.
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_id): Path<DatabaseID>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, Error> {
    let existing_category = state.category_store.get(category_id)?;
    check_ownership(&existing_category, &user)?;

    let data = payload.validate(existing_category.color)?;

    state.category_store.update(category_id, data).map(Json)
}

/// A route handler for deleting a category owned by the requester.
///
/// # Errors
/// This function will return the same ownership errors as [update_category],
/// and an [Error::CategoryInUse] if any transaction still references the
/// category.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error> {
    let existing_category = state.category_store.get(category_id)?;
    check_ownership(&existing_category, &user)?;

    if state.category_store.is_referenced(category_id)? {
        return Err(Error::CategoryInUse);
    }

    state.category_store.delete(category_id)?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

#[cfg(test)]
mod category_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_user_and_log_in, new_test_server, new_test_server_with_state},
    };

    #[tokio::test]
    async fn get_categories_without_token_is_unauthorized() {
        let server = new_test_server();

        server
            .get(endpoints::CATEGORIES)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_categories_lists_defaults_sorted_by_name() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .get(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();

        let categories = response.json::<Vec<Value>>();
        assert_eq!(categories.len(), 12);
        assert!(categories.iter().all(|category| category["isDefault"] == json!(true)));

        let names: Vec<&str> = categories
            .iter()
            .map(|category| category["name"].as_str().unwrap())
            .collect();
        let mut sorted_names = names.clone();
        sorted_names.sort();
        assert_eq!(names, sorted_names);
    }

    #[tokio::test]
    async fn create_category_returns_stored_row() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": "Groceries", "type": "EXPENSE", "color": "#00FF00" }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let category = response.json::<Value>();
        assert_eq!(category["name"], "Groceries");
        assert_eq!(category["type"], "EXPENSE");
        assert_eq!(category["color"], "#00FF00");
        assert_eq!(category["isDefault"], json!(false));
        assert!(category["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn create_category_defaults_the_color() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": "Groceries", "type": "EXPENSE" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["color"], "#FF6B6B");
    }

    #[tokio::test]
    async fn create_category_rejects_invalid_fields() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": "G", "type": "SAVINGS", "color": "green" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|detail| detail["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "type", "color"]);
    }

    #[tokio::test]
    async fn get_categories_by_type_filters_and_validates() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let response = server
            .get("/api/categories/type/INCOME")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let categories = response.json::<Vec<Value>>();
        assert_eq!(categories.len(), 4);
        assert!(categories.iter().all(|category| category["type"] == json!("INCOME")));

        server
            .get("/api/categories/type/SAVINGS")
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    async fn create_category(server: &axum_test::TestServer, token: &str, name: &str) -> Value {
        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": name, "type": "EXPENSE" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn update_category_replaces_fields_and_keeps_color_when_omitted() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category = create_category(&server, &token, "Groceries").await;
        let category_id = category["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::CATEGORY, category_id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "Food", "type": "EXPENSE" }))
            .await;

        response.assert_status_ok();

        let updated_category = response.json::<Value>();
        assert_eq!(updated_category["name"], "Food");
        assert_eq!(updated_category["color"], category["color"]);
    }

    #[tokio::test]
    async fn update_missing_category_is_not_found() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        server
            .put(&format_endpoint(endpoints::CATEGORY, 1337))
            .authorization_bearer(token)
            .json(&json!({ "name": "Food", "type": "EXPENSE" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn default_categories_cannot_be_updated_or_deleted() {
        let (server, state) = new_test_server_with_state();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;

        let default_category_id: i64 = {
            use crate::stores::CategoryStore;

            let categories = state
                .category_store
                .get_visible(crate::models::UserID::new(1))
                .unwrap();
            categories
                .iter()
                .find(|category| category.is_default)
                .unwrap()
                .id
        };

        server
            .put(&format_endpoint(endpoints::CATEGORY, default_category_id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "Hijacked", "type": "EXPENSE" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .delete(&format_endpoint(endpoints::CATEGORY, default_category_id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn other_users_categories_cannot_be_updated() {
        let server = new_test_server();
        let owner_token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category = create_category(&server, &owner_token, "Groceries").await;

        let other_token = create_user_and_log_in(&server, "bar", "bar@baz.qux").await;
        server
            .put(&format_endpoint(
                endpoints::CATEGORY,
                category["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&other_token)
            .json(&json!({ "name": "Hijacked", "type": "EXPENSE" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_category_succeeds_when_unreferenced() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category = create_category(&server, &token, "Groceries").await;

        let response = server
            .delete(&format_endpoint(
                endpoints::CATEGORY,
                category["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Category deleted successfully" }));
    }

    #[tokio::test]
    async fn delete_category_is_blocked_while_referenced() {
        let server = new_test_server();
        let token = create_user_and_log_in(&server, "foo", "foo@bar.baz").await;
        let category = create_category(&server, &token, "Groceries").await;
        let category_id = category["id"].as_i64().unwrap();

        let transaction_response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 12.50,
                "description": "Weekly shop",
                "date": "2025-06-15",
                "type": "EXPENSE",
                "categoryId": category_id,
            }))
            .await;
        transaction_response.assert_status(StatusCode::CREATED);
        let transaction_id = transaction_response.json::<Value>()["id"].as_i64().unwrap();

        server
            .delete(&format_endpoint(endpoints::CATEGORY, category_id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // Both the category and the transaction survive the failed delete.
        server
            .get(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        server
            .delete(&format_endpoint(endpoints::CATEGORY, category_id))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }
}
