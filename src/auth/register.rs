//! The route handler for registering a new user.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use email_address::EmailAddress;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, FieldError,
    models::{NewUser, PasswordHash, Username},
    stores::UserStore,
};

/// The request body for registering a new user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    /// The name the user will sign in with.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's plaintext password.
    pub password: String,
    /// The user's display name.
    pub full_name: String,
}

struct ValidRegistration {
    username: Username,
    email: EmailAddress,
    password: String,
    full_name: String,
}

impl RegisterPayload {
    /// Check every field and collect the rules that were broken.
    fn validate(self) -> Result<ValidRegistration, Error> {
        let mut details = Vec::new();

        let username = match Username::new(&self.username) {
            Ok(username) => Some(username),
            Err(message) => {
                details.push(FieldError::new("username", message));
                None
            }
        };

        let email = match EmailAddress::from_str(&self.email) {
            Ok(email) => Some(email),
            Err(_) => {
                details.push(FieldError::new("email", "email must be a valid email address"));
                None
            }
        };

        if self.password.len() < 6 {
            details.push(FieldError::new(
                "password",
                "password must be at least 6 characters",
            ));
        }

        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() || full_name.len() > 255 {
            details.push(FieldError::new(
                "fullName",
                "full name must be between 1 and 255 characters",
            ));
        }

        match (username, email) {
            (Some(username), Some(email)) if details.is_empty() => Ok(ValidRegistration {
                username,
                email,
                password: self.password,
                full_name,
            }),
            _ => Err(Error::Validation(details)),
        }
    }
}

/// A route handler for registering a new user.
///
/// Registration does not log the user in: the client is expected to follow up
/// with a login request.
///
/// # Errors
/// This function will return an [Error::Validation] if any field fails
/// validation, or an [Error::DuplicateUsername]/[Error::DuplicateEmail] if the
/// chosen identity is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, Error> {
    let registration = payload.validate()?;

    let password_hash = PasswordHash::new(&registration.password, PasswordHash::DEFAULT_COST)?;

    let user = state.user_store.create(NewUser {
        username: registration.username,
        email: registration.email,
        password_hash,
        full_name: registration.full_name,
    })?;

    tracing::info!("registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}
