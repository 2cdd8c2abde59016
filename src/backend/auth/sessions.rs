/**
 * Session Tokens
 *
 * HS256 JWTs identifying a user. The chat server only verifies them, on the
 * WebSocket upgrade; issuing belongs to the login flow. `create_token` is
 * kept for demo seeding and tests.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::messaging::UserId;

/// Lifetime of tokens minted by [`create_token`]
pub const TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username, informational only
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token verification failed: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid user ID in token: {0}")]
    InvalidSubject(String),
}

/// Create a JWT token for a user
pub fn create_token(
    secret: &str,
    user_id: UserId,
    username: Option<String>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as u64;
    let claims = Claims {
        sub: user_id.to_string(),
        username,
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}

/// Verify a token and return the user it names
pub fn user_id_from_token(secret: &str, token: &str) -> Result<UserId, AuthError> {
    let claims = verify_token(secret, token)?;
    claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidSubject(claims.sub))
}
