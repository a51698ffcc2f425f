//! User account and authenticated identity models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role given to every newly registered account
pub const DEFAULT_ROLE: &str = "DEV";

/// User account as held by the credential store
///
/// The password field always carries the Argon2 hash and is never serialized,
/// so a `User` can be returned from an endpoint without leaking it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, generated at creation
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique among non-deleted users, used for login)
    pub email: String,

    /// Contact phone number
    pub phone: String,

    /// Password hash
    #[serde(skip_serializing, default)]
    pub password: String,

    /// Account role
    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh account record from a registration
    pub fn from_new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            password: new_user.password_hash,
            role: new_user.role,
            activated_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Drop the password hash before the record leaves the service
    pub fn redacted(mut self) -> Self {
        self.password.clear();
        self
    }

    /// Resolve the principal for this account
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            roles: vec![self.role.clone()],
        }
    }
}

/// Account data ready to be persisted (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
}

/// Lookup predicate for the credential store
///
/// Every filter implicitly excludes soft-deleted accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Email(String),
    Id(Uuid),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if user.is_deleted() {
            return false;
        }
        match self {
            UserFilter::Email(email) => user.email == *email,
            UserFilter::Id(id) => user.id == *id,
        }
    }
}

/// Authenticated principal attached to a request
///
/// Carries no secret material; built once per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Account identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Granted roles
    pub roles: Vec<String>,
}
