//! usergate core - domain models, errors and configuration
//!
//! This crate defines the abstractions shared by the service:
//! - User account and identity models
//! - The error taxonomy surfaced by the account use cases
//! - Configuration management

pub mod config;
pub mod user;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use user::{Identity, NewUser, User, UserFilter, DEFAULT_ROLE};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Account errors
///
/// `Display` is the generic client message; the payload is the detail for
/// logs. Authentication failures have their own type in the API crate.
#[derive(Error, Debug)]
pub enum UsergateError {
    #[error("invalid")]
    Invalid(String),

    #[error("on save")]
    StoreFailure(String),
}

impl UsergateError {
    /// Detail kept for logs only, never sent to clients
    pub fn detail(&self) -> &str {
        match self {
            Self::Invalid(detail) | Self::StoreFailure(detail) => detail,
        }
    }
}

pub type Result<T> = std::result::Result<T, UsergateError>;
