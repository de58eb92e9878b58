//! In-process credential store
//!
//! Holds every account behind one mutex, so the uniqueness check and the
//! insert form a single critical section.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::CredentialStore;
use crate::{
    error::{DuplicateField, StoreError},
    models::{Account, NewAccount},
};

/// Credential store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft-delete an account. Returns whether the account existed.
    pub async fn deactivate(&self, id: Uuid) -> bool {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, new_account: &NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;

        let username = new_account.username.to_lowercase();
        let email = new_account.email.to_lowercase();

        if accounts
            .values()
            .any(|a| a.username.to_lowercase() == username)
        {
            return Err(StoreError::Duplicate {
                field: DuplicateField::Username,
            });
        }
        if accounts.values().any(|a| a.email.to_lowercase() == email) {
            return Err(StoreError::Duplicate {
                field: DuplicateField::Email,
            });
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: new_account.username.clone(),
            email: new_account.email.clone(),
            password_hash: new_account.password_hash.clone(),
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
        };
        accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let username = username.to_lowercase();
        let accounts = self.accounts.lock().await;

        Ok(accounts
            .values()
            .find(|a| a.is_active && a.username.to_lowercase() == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).filter(|a| a.is_active).cloned())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.last_login = Some(at);
        }
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.len() as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
