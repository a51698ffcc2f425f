//! Bearer token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the resolved identity and an
//! expiration time. The signing secret is static for the life of the process;
//! its identifier travels in the `kid` header and must match on verification.

use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use usergate_core::{AuthConfig, Identity};
use uuid::Uuid;

/// JWT claims embedded in every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// Unique token identifier
    pub jti: String,
    /// Issued at (Unix epoch seconds)
    pub iat: u64,
    /// Expiration (Unix epoch seconds)
    pub exp: u64,
    /// User's display name
    pub name: String,
    /// User's email address
    pub email: String,
    /// Granted roles
    pub roles: Vec<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

/// Token issuing and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token signed with unknown key id")]
    KeyMismatch,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

impl TokenError {
    /// Whether the token was well-formed and signed but is past its expiry
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::ExpiredToken)
    }
}

/// Stateless issuer/verifier bound to one static secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret_id: String,
    issuer: String,
    expiry: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret_id", &self.secret_id)
            .field("issuer", &self.issuer)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        secret_id: impl Into<String>,
        issuer: impl Into<String>,
        expiry: Duration,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            issuer: issuer.into(),
            expiry,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.secret.as_bytes(),
            config.secret_id.clone(),
            config.issuer.clone(),
            config.token_expiry(),
        )
    }

    /// Lifetime applied by [`TokenIssuer::issue_default`]
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a token for `identity` using the configured lifetime
    pub fn issue_default(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, self.expiry)
    }

    /// Issue a signed token for `identity` that expires after `expires_in`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use usergate_api::auth::token::TokenIssuer;
    /// use usergate_core::Identity;
    ///
    /// let issuer = TokenIssuer::new(b"secret", "secret-id", "usergate", Duration::from_secs(3600));
    /// let identity = Identity {
    ///     id: "42".to_string(),
    ///     name: "Ada".to_string(),
    ///     email: "ada@example.com".to_string(),
    ///     roles: vec!["DEV".to_string()],
    /// };
    /// let token = issuer.issue(&identity, Duration::from_secs(60)).unwrap();
    /// assert_eq!(issuer.verify(&token).unwrap(), identity);
    /// ```
    pub fn issue(&self, identity: &Identity, expires_in: Duration) -> Result<String, TokenError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.id.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(expires_in.as_secs()),
            name: identity.name.clone(),
            email: identity.email.clone(),
            roles: identity.roles.clone(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.secret_id.clone());

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Verify signature, key id, issuer and expiry, returning the embedded identity
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::InvalidToken)?;
        if header.kid.as_deref() != Some(self.secret_id.as_str()) {
            return Err(TokenError::KeyMismatch);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::InvalidToken,
            },
        )?;

        Ok(token_data.claims.into())
    }
}
