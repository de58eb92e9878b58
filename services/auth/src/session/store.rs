//! Session storage backends

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::error::CacheResult;
use tokio::sync::Mutex;

use crate::models::Session;

/// Storage for live sessions keyed by token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a freshly created session
    async fn insert(&self, session: &Session, ttl: Duration) -> CacheResult<()>;

    /// Renew a live session at `now`. Returns `None` when the token is
    /// unknown or its window has elapsed; never brings a session back.
    async fn touch(
        &self,
        token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> CacheResult<Option<Session>>;

    /// Read a live session without renewing it
    async fn get(&self, token: &str, now: DateTime<Utc>) -> CacheResult<Option<Session>>;

    /// Remove a session. Removing an unknown token is not an error.
    async fn remove(&self, token: &str) -> CacheResult<()>;

    /// Drop every session expired at `now`, returning how many were dropped
    async fn sweep_expired(&self, now: DateTime<Utc>) -> CacheResult<usize>;
}

/// Session table kept in process memory.
///
/// All operations go through one lock, so per-token operations are applied
/// in arrival order and a destroy issued after a touch always wins.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions held, expired ones included until swept
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session, _ttl: Duration) -> CacheResult<()> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn touch(
        &self,
        token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> CacheResult<Option<Session>> {
        let mut sessions = self.sessions.lock().await;

        match sessions.get_mut(token) {
            Some(session) if !session.is_expired(now) => {
                session.renew(now, ttl);
                return Ok(Some(session.clone()));
            }
            Some(_) => {}
            None => return Ok(None),
        }

        sessions.remove(token);
        Ok(None)
    }

    async fn get(&self, token: &str, now: DateTime<Utc>) -> CacheResult<Option<Session>> {
        let mut sessions = self.sessions.lock().await;

        let expired = match sessions.get(token) {
            Some(session) => session.is_expired(now),
            None => return Ok(None),
        };

        if expired {
            sessions.remove(token);
            return Ok(None);
        }
        Ok(sessions.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> CacheResult<()> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> CacheResult<usize> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session(token: &str, now: DateTime<Utc>, ttl: Duration) -> Session {
        Session::new(token.to_string(), Uuid::new_v4(), now, ttl)
    }

    #[tokio::test]
    async fn test_touch_expired_session_removes_it() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let ttl = Duration::minutes(5);
        store.insert(&session("a", now, ttl), ttl).await.unwrap();

        let later = now + Duration::minutes(6);
        assert!(store.touch("a", later, ttl).await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
        // no way back once expired
        assert!(store.touch("a", now, ttl).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sweep_only_drops_expired() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        store
            .insert(&session("short", now, Duration::minutes(1)), Duration::minutes(1))
            .await
            .unwrap();
        store
            .insert(&session("long", now, Duration::hours(1)), Duration::hours(1))
            .await
            .unwrap();

        let swept = store.sweep_expired(now + Duration::minutes(2)).await.unwrap();
        assert_eq!(swept, 1);
        assert!(store.get("long", now).await.unwrap().is_some());
        assert!(store.get("short", now).await.unwrap().is_none());
    }
}
