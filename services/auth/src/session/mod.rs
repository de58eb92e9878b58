//! Session management
//!
//! A session is `Active` while inside its TTL window, and every touch slides
//! the window forward. Once the window elapses it is `Expired` and behaves
//! exactly like a destroyed one: absent on the next lookup, with no way back.
//! Expiry is checked lazily on access; the sweeper only reclaims memory.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::AuthResult, models::Session};

pub mod redis_store;
pub mod store;
pub mod sweeper;

pub use redis_store::RedisSessionStore;
pub use store::{MemorySessionStore, SessionStore};
pub use sweeper::SessionSweeper;

/// Length of generated session tokens
pub const TOKEN_LENGTH: usize = 64;

/// Default rolling session lifetime
pub const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Longest accepted session lifetime (one year)
pub const MAX_TTL_SECONDS: i64 = 365 * DEFAULT_TTL_SECONDS;

/// Creates, renews, resolves and destroys sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a session manager over the given store
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Session manager over a fresh in-memory store
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), ttl)
    }

    /// Rolling lifetime applied on creation and on every touch
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a new session for an account
    pub async fn create(&self, account_id: Uuid) -> AuthResult<Session> {
        self.create_at(account_id, Utc::now()).await
    }

    /// Renew a live session, or `None` when the token is unknown or expired
    pub async fn touch(&self, token: &str) -> AuthResult<Option<Session>> {
        self.touch_at(token, Utc::now()).await
    }

    /// End a session. Idempotent.
    pub async fn destroy(&self, token: &str) -> AuthResult<()> {
        if token.is_empty() {
            return Ok(());
        }
        self.store.remove(token).await?;
        info!("Session destroyed");
        Ok(())
    }

    /// Account owning a live session, without renewing it
    pub async fn resolve(&self, token: &str) -> AuthResult<Option<Uuid>> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Reclaim storage held by expired sessions
    pub async fn sweep_expired(&self) -> AuthResult<usize> {
        Ok(self.store.sweep_expired(Utc::now()).await?)
    }

    pub(crate) async fn create_at(&self, account_id: Uuid, now: DateTime<Utc>) -> AuthResult<Session> {
        let session = Session::new(generate_token(), account_id, now, self.ttl);
        self.store.insert(&session, self.ttl).await?;

        info!("Session created for account: {}", account_id);
        Ok(session)
    }

    pub(crate) async fn touch_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Option<Session>> {
        if token.is_empty() {
            return Ok(None);
        }

        let session = self.store.touch(token, now, self.ttl).await?;
        if session.is_none() {
            debug!("Touched unknown or expired session");
        }
        Ok(session)
    }

    pub(crate) async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Option<Uuid>> {
        if token.is_empty() {
            return Ok(None);
        }

        let session = self.store.get(token, now).await?;
        Ok(session.map(|s| s.account_id))
    }
}

/// Unguessable session token drawn from the thread-local CSPRNG
fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
