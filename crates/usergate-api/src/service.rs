//! Account service
//!
//! Sign-up validates the payload, hashes the password and persists the
//! account. Errors are reported with the core taxonomy so handlers can map
//! them to generic client messages.

use crate::auth::PasswordHasher;
use crate::store::UserStore;
use serde::Deserialize;
use std::sync::Arc;
use usergate_core::{NewUser, Result, User, UsergateError, DEFAULT_ROLE};
use utoipa::ToSchema;
use validator::Validate;

/// Sign-up payload
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SignUpRequest {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1), email)]
    pub email: String,

    /// Contact number; `whatsapp` is accepted as an alias
    #[serde(alias = "whatsapp")]
    #[validate(length(min = 1))]
    pub phone: String,

    #[validate(length(min = 1))]
    pub password: String,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"***")
            .finish()
    }
}

/// Account use cases
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Register a new account
    ///
    /// The returned record never carries the password hash. New accounts
    /// always get [`DEFAULT_ROLE`].
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User> {
        request
            .validate()
            .map_err(|e| UsergateError::Invalid(e.to_string()))?;

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|e| UsergateError::StoreFailure(e.to_string()))?;

        let user = self
            .store
            .store(NewUser {
                name: request.name,
                email: request.email,
                phone: request.phone,
                password_hash,
                role: DEFAULT_ROLE.to_string(),
            })
            .await
            .map_err(|e| UsergateError::StoreFailure(e.to_string()))?;

        tracing::info!(user_id = %user.id, email = %user.email, "user signed up");
        Ok(user.redacted())
    }
}
