//! Helper functions for use in tests.

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::json;
use time::Duration;

use crate::{
    AppState, build_router,
    db::{DbPool, initialize},
    endpoints,
    models::{CategoryName, CategoryType, Color, NewUser, PasswordHash, Username},
    stores::CategoryData,
};

/// Create an initialized in-memory database pool.
///
/// The pool is capped at a single connection so that every pooled handle sees
/// the same in-memory database.
pub fn new_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory()
        .with_init(|connection| connection.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Could not create database pool.");

    initialize(&pool.get().expect("Could not get database connection."))
        .expect("Could not initialize database.");

    pool
}

/// Create an [AppState] backed by an in-memory database.
pub fn new_test_state() -> AppState {
    AppState::new(new_test_pool(), "wowwhatasecret", Duration::hours(1))
}

/// Create a test server running the full application router.
pub fn new_test_server() -> TestServer {
    new_test_server_with_state().0
}

/// Create a test server running the full application router, along with the
/// state backing it for direct store access.
pub fn new_test_server_with_state() -> (TestServer, AppState) {
    let state = new_test_state();
    let app = build_router(
        state.clone(),
        HeaderValue::from_static("http://localhost:3000"),
    );

    (
        TestServer::new(app),
        state,
    )
}

/// The data for inserting a test user directly into a store.
pub fn new_test_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Username::new_unchecked(username),
        email: email.parse().expect("Could not parse email."),
        password_hash: PasswordHash::new_unchecked("hunter2"),
        full_name: "Test User".to_string(),
    }
}

/// The data for inserting a test expense category directly into a store.
pub fn new_test_category_data(name: &str) -> CategoryData {
    CategoryData {
        name: CategoryName::new_unchecked(name),
        description: None,
        category_type: CategoryType::Expense,
        color: Color::default(),
    }
}

/// Register a user through the API.
pub async fn register_test_user(server: &TestServer, username: &str, email: &str, password: &str) {
    server
        .post(endpoints::REGISTER)
        .json(&json!({
            "username": username,
            "email": email,
            "password": password,
            "fullName": "Test User",
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

/// Register a user through the API, sign them in and return their bearer
/// token.
pub async fn create_user_and_log_in(server: &TestServer, username: &str, email: &str) -> String {
    register_test_user(server, username, email, "hunter2").await;

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "username": username, "password": "hunter2" }))
        .await;

    response.assert_status_ok();

    response.json::<serde_json::Value>()["token"]
        .as_str()
        .expect("Expected a token in the login response.")
        .to_string()
}
