//! Authentication strategies
//!
//! Each strategy establishes an identity from request headers in its own
//! way. The gateway holds them as an ordered list of trait objects and stops
//! at the first one that succeeds.

use super::basic::{strip_scheme, BasicAuthValidator, BasicCredentials};
use super::cache::{credential_key, ResultCache};
use super::gateway::AuthError;
use super::token::TokenIssuer;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use std::sync::Arc;
use usergate_core::Identity;

/// One pluggable way of establishing identity from a request
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError>;
}

fn authorization(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)
}

/// Verifies `Authorization: Bearer <token>`
pub struct TokenStrategy {
    issuer: Arc<TokenIssuer>,
}

impl TokenStrategy {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl Authenticator for TokenStrategy {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = strip_scheme(authorization(headers)?, "Bearer")
            .ok_or(AuthError::UnsupportedScheme)?;

        Ok(self.issuer.verify(token.trim())?)
    }
}

/// Verifies `Authorization: Basic ...`, consulting the result cache first
pub struct BasicStrategy {
    validator: BasicAuthValidator,
    cache: ResultCache,
}

impl BasicStrategy {
    pub fn new(validator: BasicAuthValidator, cache: ResultCache) -> Self {
        Self { validator, cache }
    }
}

#[async_trait]
impl Authenticator for BasicStrategy {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let value = authorization(headers)?;
        if strip_scheme(value, "Basic").is_none() {
            return Err(AuthError::UnsupportedScheme);
        }

        let key = credential_key(value);
        if let Some(identity) = self.cache.get(&key).await {
            tracing::debug!(user_id = %identity.id, "basic auth served from cache");
            return Ok(identity);
        }

        let credentials = BasicCredentials::from_header(value)?;
        let identity = self
            .validator
            .authenticate(&credentials.username, &credentials.password)
            .await?;

        self.cache.put(&key, identity.clone()).await;
        Ok(identity)
    }
}
