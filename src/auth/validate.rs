//! The route handler for re-validating a bearer token.

use axum::{Extension, Json};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::auth::{AuthResponse, AuthUser};

/// A route handler that re-validates the presented bearer token.
///
/// The token has already been checked by the auth middleware by the time this
/// handler runs, so it simply echoes the token back alongside the current
/// profile fields of the resolved user.
pub async fn validate(
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Json<AuthResponse> {
    Json(AuthResponse {
        token: bearer.token().to_string(),
        username: user.username,
        email: user.email,
        full_name: user.full_name,
    })
}
