//! Basic-auth credential parsing and validation
//!
//! The validator resolves a user by email and checks the supplied password
//! against the stored hash. Unknown accounts, store failures and wrong
//! passwords all surface as the same [`AuthError::InvalidCredentials`] so a
//! caller cannot tell whether an account exists.

use super::gateway::AuthError;
use super::password::PasswordHasher;
use crate::store::UserStore;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use usergate_core::{Identity, UserFilter};

/// Strip `scheme` and the following space from an `Authorization` value,
/// matching the scheme case-insensitively
pub fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let split = scheme.len();
    let (head, rest) = (value.get(..split)?, value.get(split..)?);
    if !head.eq_ignore_ascii_case(scheme) {
        return None;
    }
    rest.strip_prefix(' ')
}

/// Username/password pair decoded from a `Basic` authorization header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl BasicCredentials {
    /// Parse an `Authorization` header value of the form `Basic base64(user:pass)`
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let encoded = strip_scheme(value, "Basic").ok_or(AuthError::UnsupportedScheme)?;

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

        // The password may itself contain ':'
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Encode as an `Authorization` header value
    pub fn to_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

/// Checks email/password pairs against the credential store
#[derive(Clone)]
pub struct BasicAuthValidator {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl BasicAuthValidator {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Resolve the identity for `username` (an email) if `password` verifies
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let user = self
            .store
            .find_one(&UserFilter::Email(username.to_string()))
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "basic auth lookup failed");
                AuthError::InvalidCredentials
            })?;

        self.hasher.verify(&user.password, password).map_err(|e| {
            tracing::debug!(user_id = %user.id, error = %e, "basic auth password rejected");
            AuthError::InvalidCredentials
        })?;

        Ok(user.identity())
    }
}
