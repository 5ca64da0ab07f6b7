//! The route handler for signing in a user.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, auth::issue_token, models::User, stores::UserStore};

/// The request body for signing in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Username entered during sign-in.
    pub username: String,
    /// Password entered during sign-in.
    pub password: String,
}

/// The response body for a successful sign-in or token validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The signed bearer token.
    pub token: String,
    /// The unique name the user signs in with.
    pub username: String,
    /// The email address associated with the user.
    pub email: String,
    /// The user's display name.
    pub full_name: String,
}

impl AuthResponse {
    /// Build the response for `user` carrying `token`.
    pub fn new(token: String, user: &User) -> Self {
        Self {
            token,
            username: user.username.to_string(),
            email: user.email.to_string(),
            full_name: user.full_name.clone(),
        }
    }
}

/// A route handler for signing in a user with a username and password.
///
/// # Errors
/// This function will return an [Error::InvalidCredentials] if the username is
/// unknown or the password does not match. The two cases produce the same
/// response so that usernames cannot be enumerated.
pub async fn log_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, Error> {
    let user = state
        .user_store
        .get_by_username(&credentials.username)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?;

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = issue_token(&user, state.jwt_keys.encoding_key(), state.token_duration)?;

    Ok(Json(AuthResponse::new(token, &user)))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{new_test_server, register_test_user},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = new_test_server();
        register_test_user(&server, "foo", "foo@bar.baz", "hunter2").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "foo", "password": "hunter2" }))
            .await;

        response.assert_status_ok();

        let body = response.json::<Value>();
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["username"], "foo");
        assert_eq!(body["email"], "foo@bar.baz");
        assert_eq!(body["fullName"], "Test User");
    }

    #[tokio::test]
    async fn log_in_failures_are_indistinguishable() {
        let server = new_test_server();
        register_test_user(&server, "foo", "foo@bar.baz", "hunter2").await;

        let wrong_password_response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "foo", "password": "wrong" }))
            .await;
        let unknown_username_response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "nobody", "password": "hunter2" }))
            .await;

        wrong_password_response.assert_status(StatusCode::UNAUTHORIZED);
        unknown_username_response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password_response.json::<Value>(),
            unknown_username_response.json::<Value>(),
        );
    }
}
