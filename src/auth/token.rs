//! Issuing and verification of the JSON Web Tokens used as bearer credentials.

// Code in this module is adapted from https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, models::User};

/// The contents of a JSON Web Token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: i64,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The email of the user the token was issued to.
    pub email: String,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
}

/// The keys for signing and verifying bearer tokens, derived from the
/// server-held secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Create the signing and verification keys from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// The encoding key for signing tokens.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// The decoding key for verifying tokens.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Create a signed bearer token for `user` that expires after `duration`.
///
/// # Errors
/// This function will return an [Error::TokenCreation] if the token could not
/// be signed, which indicates a problem with the signing key.
pub fn issue_token(
    user: &User,
    encoding_key: &EncodingKey,
    duration: Duration,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user.id.as_i64(),
        username: user.username.to_string(),
        email: user.email.to_string(),
        iat: now.unix_timestamp() as usize,
        exp: (now + duration).unix_timestamp() as usize,
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify a bearer token and return its claims.
///
/// # Errors
/// This function will return an [Error::ExpiredToken] if the token is past its
/// expiry time, or an [Error::InvalidToken] if it is malformed or its
/// signature does not verify.
pub fn verify_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::ExpiredToken,
            _ => Error::InvalidToken,
        })
}
