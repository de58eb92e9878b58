//! Account service
//!
//! Orchestrates registration, authentication and profile lookups over a
//! credential store, the password hasher and the session manager.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    models::{Account, NewAccount, Session},
    password::PasswordHasher,
    repositories::CredentialStore,
    session::SessionManager,
    validation::validate_registration,
};

/// An account together with the session just opened for it
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub account: Account,
    pub session: Session,
}

/// An account with the global account count
#[derive(Debug, Clone)]
pub struct Profile {
    pub account: Account,
    pub total_accounts: i64,
}

/// Registration and authentication rules
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    sessions: SessionManager,
}

impl AccountService {
    /// Create a new account service
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        sessions: SessionManager,
    ) -> Self {
        Self {
            store,
            hasher,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Create an account and open a session for it.
    ///
    /// Uniqueness is decided by the store's insert, so of two racing
    /// registrations for the same name exactly one succeeds.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<Authenticated> {
        // rules apply to the stored form; lowercasing can change the length
        let username = username.trim().to_lowercase();
        let email = email.trim().to_lowercase();
        validate_registration(&username, &email, password)?;

        let new_account = NewAccount {
            username,
            email,
            password_hash: self.hasher.hash(password).await?,
        };

        let account = self.store.insert(&new_account).await.map_err(|e| {
            let err = AuthError::from(e);
            if let AuthError::Conflict { field } = &err {
                info!("Registration rejected, {} taken: {}", field, new_account.username);
            }
            err
        })?;
        info!("Registered account {} ({})", account.username, account.id);

        let session = self.sessions.create(account.id).await?;
        Ok(Authenticated { account, session })
    }

    /// Check a username/password pair and open a session.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Authenticated> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::validation(
                "Username and password are required",
                None,
            ));
        }

        info!("Login attempt for user: {}", username);

        let Some(mut account) = self.store.find_active_by_username(username).await? else {
            // same Argon2 work as a wrong password, so timing does not reveal the miss
            self.hasher.verify_dummy(password).await;
            info!("Login failed for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &account.password_hash).await {
            info!("Login failed for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        match self.store.touch_last_login(account.id, now).await {
            Ok(()) => account.last_login = Some(now),
            Err(e) => warn!("Failed to record last login for {}: {}", account.id, e),
        }

        let session = self.sessions.create(account.id).await?;
        info!("Login successful for user: {}", account.username);

        Ok(Authenticated { account, session })
    }

    /// Active account by id, with the total number of accounts
    pub async fn get_profile(&self, account_id: Uuid) -> AuthResult<Profile> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        let total_accounts = self.store.count_all().await?;

        Ok(Profile {
            account,
            total_accounts,
        })
    }
}
