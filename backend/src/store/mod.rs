//! User storage.
//!
//! The session issuer only talks to [`UserRepository`], so the in-memory
//! store can be swapped for a database-backed one without touching the
//! lockout logic. Per-account mutual exclusion is part of the contract:
//! callers hold the guard from [`UserRepository::lock_account`] across a
//! read-modify-write of the lockout fields.

pub mod memory;

pub use memory::InMemoryUserRepository;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::models::User;

/// Held while an account's lockout state is being read and rewritten.
/// Dropping it lets the next request for the same account proceed.
pub type AccountGuard = OwnedMutexGuard<()>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("A user with id {0} already exists")]
    DuplicateId(String),
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations needed by the session issuer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Look up an account by its exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Add a new account. Fails if the id or email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    /// Replace the stored record with the same id.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Acquire the per-account guard. Guards for different ids never block
    /// each other.
    async fn lock_account(&self, id: &str) -> Result<AccountGuard, StoreError>;
}
