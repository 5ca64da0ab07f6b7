//! Authentication middleware that resolves bearer tokens to live users.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::DecodingKey;

use crate::{
    AppState, Error,
    auth::verify_token,
    models::{User, UserID},
    stores::{UserStore, sqlite::SQLiteUserStore},
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying bearer tokens.
    pub decoding_key: DecodingKey,
    /// The store used to resolve token subjects to users.
    pub user_store: SQLiteUserStore,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.jwt_keys.decoding_key().clone(),
            user_store: state.user_store.clone(),
        }
    }
}

/// The resolved identity of the requester, attached to the request by
/// [auth_guard].
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    /// The user's ID in the database.
    pub id: UserID,
    /// The unique name the user signs in with.
    pub username: String,
    /// The email address associated with the user.
    pub email: String,
    /// The user's display name.
    pub full_name: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.to_string(),
            full_name: user.full_name,
        }
    }
}

/// Middleware function that checks for a valid bearer token and a live user.
///
/// Requests without a parseable `Authorization: Bearer` header are rejected
/// with 401. Requests whose token is malformed or expired are rejected with
/// 403. Requests whose token subject no longer exists are rejected with 401.
/// Otherwise the resolved [AuthUser] is placed into the request extensions and
/// the request executed normally.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<AuthUser>` to receive the resolved user.
pub async fn auth_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::MissingToken)?;

    let claims = verify_token(bearer.token(), &state.decoding_key)?;

    let user = state
        .user_store
        .get(UserID::new(claims.sub))
        .map_err(|error| match error {
            Error::NotFound => Error::UserNoLongerExists,
            error => error,
        })?;

    parts.extensions.insert(AuthUser::from(user));

    Ok(next.run(Request::from_parts(parts, body)).await)
}
