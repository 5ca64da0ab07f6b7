//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Json, Router,
    http::{
        HeaderValue,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState, auth, category, endpoints, logging::logging_middleware, summary, transaction,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed only from `allowed_origin`.
pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(auth::register))
        .route(endpoints::LOG_IN, post(auth::log_in));

    let protected_routes = Router::new()
        .route(endpoints::VALIDATE, get(auth::validate))
        .route(
            endpoints::CATEGORIES,
            get(category::get_categories).post(category::create_category),
        )
        .route(
            endpoints::CATEGORIES_BY_TYPE,
            get(category::get_categories_by_type),
        )
        .route(
            endpoints::CATEGORY,
            put(category::update_category).delete(category::delete_category),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(transaction::get_transactions).post(transaction::create_transaction),
        )
        .route(
            endpoints::TRANSACTIONS_DATE_RANGE,
            get(transaction::get_transactions_by_date_range),
        )
        .route(
            endpoints::TRANSACTIONS_BY_TYPE,
            get(transaction::get_transactions_by_type),
        )
        .route(
            endpoints::TRANSACTIONS_MONTHLY,
            get(transaction::get_transactions_by_month),
        )
        .route(endpoints::SUMMARY, get(summary::get_current_summary))
        .route(endpoints::SUMMARY_MONTHLY, get(summary::get_monthly_summary))
        .route(
            endpoints::TRANSACTION,
            get(transaction::get_transaction)
                .put(transaction::update_transaction)
                .delete(transaction::delete_transaction),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .layer(middleware::from_fn(logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        )
        .with_state(state)
}

/// The liveness probe.
async fn get_health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
