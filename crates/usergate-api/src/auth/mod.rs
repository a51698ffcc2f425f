//! Authentication module
//!
//! Requests pass through a gateway that tries an ordered list of strategies:
//! - Bearer token verification (HS256, `kid` checked)
//! - Basic-auth against the credential store, fronted by a TTL result cache
//!
//! Passwords are hashed with Argon2. Tokens are only issued by the sign-in
//! endpoint after one of the strategies has accepted the request.

pub mod basic;
pub mod cache;
pub mod gateway;
pub mod password;
pub mod strategy;
pub mod token;

pub use basic::{BasicAuthValidator, BasicCredentials};
pub use cache::{credential_key, CacheStats, ResultCache};
pub use gateway::{gateway_middleware, AuthError, Decision, Gateway, Whitelist};
pub use password::{Argon2Hasher, PasswordConfig, PasswordError, PasswordHasher};
pub use strategy::{Authenticator, BasicStrategy, TokenStrategy};
pub use token::{Claims, TokenError, TokenIssuer};
