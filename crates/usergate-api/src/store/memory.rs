//! In-memory credential store for tests and local runs

use super::{StoreError, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use usergate_core::{NewUser, User, UserFilter};

/// Process-local [`UserStore`] with the same uniqueness and soft-delete rules
/// as the PostgreSQL store
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    lookups: AtomicU64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_one` calls served so far
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Mark the live account with `email` as deleted
    pub async fn soft_delete(&self, email: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.email == email && !u.is_deleted())
            .ok_or(StoreError::NotFound)?;

        let now = Utc::now();
        user.deleted_at = Some(now);
        user.updated_at = now;
        Ok(())
    }

    /// Raw stored record, including deleted rows and the password hash
    pub async fn raw(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email && !u.is_deleted()) {
            return Err(StoreError::Conflict);
        }

        let user = User::from_new(user);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<User, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .read()
            .await
            .iter()
            .find(|u| filter.matches(u))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
