//! Authentication and caller resolution
//!
//! Bearer tokens are HS256 JWTs whose `sub` is the caller identity (the
//! lecturer's email for lecturers) and whose `roles` lists role names.
//! Credential checking and token issuance for real users happen elsewhere;
//! [`create_token`] exists for tooling and tests.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain_claims::{Caller, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity)
    pub sub: String,
    /// Role names
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Resolves the caller, acting in the first recognized role
    ///
    /// Unrecognized role names are skipped; a token with none fails.
    pub fn caller(&self) -> Result<Caller, AuthError> {
        let role = self
            .roles
            .iter()
            .find_map(|name| name.parse::<Role>().ok())
            .ok_or(AuthError::NoRecognizedRole)?;

        Ok(Caller::new(self.sub.clone(), role))
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token carries no recognized role")]
    NoRecognizedRole,
    #[error("Token lifetime of {0} seconds is out of range")]
    InvalidExpiration(u64),
}

/// Creates a signed token for `subject` with the given role names
pub fn create_token(
    subject: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = i64::try_from(expiration_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(AuthError::InvalidExpiration(expiration_secs))?;

    let claims = Claims {
        sub: subject.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Creates a token for one role
pub fn create_role_token(
    subject: &str,
    role: Role,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    create_token(subject, vec![role.as_str().to_string()], secret, expiration_secs)
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
