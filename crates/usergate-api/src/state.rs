//! Application state management

use crate::auth::{BasicAuthValidator, Gateway, PasswordHasher, ResultCache, TokenIssuer};
use crate::service::UserService;
use crate::store::UserStore;
use std::sync::Arc;
use std::time::Instant;
use usergate_core::config::AppConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Authentication gateway, also used to issue tokens at sign-in
    pub gateway: Arc<Gateway>,
    /// Account use cases
    pub users: UserService,
    /// Basic-auth result cache, shared with the gateway
    pub cache: ResultCache,
}

impl AppState {
    /// Wire the gateway and account service around one store and hasher
    pub fn new(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config.auth));
        let cache = ResultCache::from_config(&config.auth);
        let validator = BasicAuthValidator::new(Arc::clone(&store), Arc::clone(&hasher));
        let gateway = Arc::new(Gateway::standard(tokens, validator, cache.clone()));

        tracing::debug!(
            token_expiry_secs = config.auth.token_expiry_secs,
            cache_ttl_secs = config.auth.cache_ttl_secs,
            "authentication gateway configured"
        );

        Self {
            users: UserService::new(store, hasher),
            config,
            start_time: Instant::now(),
            gateway,
            cache,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
