//! Credential stores
//!
//! The account table is the only shared mutable resource of the service.
//! Every store enforces case-insensitive uniqueness of username and email
//! inside its own insert, never through a separate read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Account, NewAccount},
};

pub mod account;
pub mod memory;

pub use account::PgCredentialStore;
pub use memory::MemoryCredentialStore;

/// Persistent table of accounts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert an account, failing with [`StoreError::Duplicate`] when the
    /// username or email is taken by any account, active or not.
    async fn insert(&self, new_account: &NewAccount) -> Result<Account, StoreError>;

    /// Case-insensitive lookup among active accounts
    async fn find_active_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Lookup of an active account by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Record a successful login
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Number of accounts, active and inactive
    async fn count_all(&self) -> Result<i64, StoreError>;

    /// Whether the backing storage is reachable
    async fn health_check(&self) -> bool;
}
