//! In-process user store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::{AccountGuard, StoreError, UserRepository};
use crate::models::User;

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<String, User>,
    /// email -> id
    by_email: HashMap<String, String>,
}

/// User store backed by a `HashMap`, with one async mutex per account.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Users>,
    account_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `users`.
    pub async fn with_users(users: Vec<User>) -> Result<Self, StoreError> {
        let repo = Self::new();
        for user in users {
            repo.insert(user).await?;
        }
        Ok(repo)
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_id.get(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.by_id.contains_key(&user.id) {
            return Err(StoreError::DuplicateId(user.id));
        }
        if users.by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        users.by_email.insert(user.email.clone(), user.id.clone());
        users.by_id.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let previous_email = match users.by_id.get(&user.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound(user.id.clone())),
        };

        if previous_email != user.email {
            if users.by_email.contains_key(&user.email) {
                return Err(StoreError::DuplicateEmail(user.email.clone()));
            }
            users.by_email.remove(&previous_email);
            users.by_email.insert(user.email.clone(), user.id.clone());
        }

        users.by_id.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn lock_account(&self, id: &str) -> Result<AccountGuard, StoreError> {
        let lock = {
            let mut locks = self.account_locks.lock().await;
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        Ok(lock.lock_owned().await)
    }
}
