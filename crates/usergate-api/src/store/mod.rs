//! Credential store
//!
//! Holds one [`User`] record per account. The gateway and the account service
//! only see the [`UserStore`] trait; errors are opaque to them.
//!
//! - [`postgres::PgUserStore`] - PostgreSQL via sqlx
//! - [`memory::InMemoryUserStore`] - process-local store for tests

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use thiserror::Error;
use usergate_core::{NewUser, User, UserFilter};

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    Conflict,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Persistence operations on user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new account, returning the stored record
    async fn store(&self, user: NewUser) -> Result<User, StoreError>;

    /// Find the single non-deleted account matching `filter`
    async fn find_one(&self, filter: &UserFilter) -> Result<User, StoreError>;
}
