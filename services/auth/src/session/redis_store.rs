//! Redis-backed session store
//!
//! One key per token with a native TTL. Redis owns expiry: a key that has
//! timed out is simply gone. A touch refreshes the TTL with `GETEX` and then
//! stores the renewed timestamps with `SET .. XX KEEPTTL`; neither command
//! creates a key, so a renewal can never recreate a key removed by logout.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{
    cache::RedisPool,
    error::{CacheError, CacheResult},
};
use tracing::debug;

use super::store::SessionStore;
use crate::models::Session;

const KEY_PREFIX: &str = "session:";

/// Session store keeping one Redis key per session
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }
}

fn session_key(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, token)
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.num_seconds().max(1) as u64
}

fn decode(raw: &str) -> CacheResult<Session> {
    serde_json::from_str(raw).map_err(|e| CacheError::Serialization(e.to_string()))
}

fn encode(session: &Session) -> CacheResult<String> {
    serde_json::to_string(session).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: &Session, ttl: Duration) -> CacheResult<()> {
        let value = encode(session)?;

        self.redis_pool
            .set(&session_key(&session.token), &value, Some(ttl_seconds(ttl)))
            .await
    }

    async fn touch(
        &self,
        token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> CacheResult<Option<Session>> {
        let raw = self
            .redis_pool
            .get_and_expire(&session_key(token), ttl_seconds(ttl))
            .await?;

        match raw {
            Some(raw) => {
                let mut session = decode(&raw)?;
                session.renew(now, ttl);

                let key = session_key(token);
                if !self.redis_pool.replace_keep_ttl(&key, &encode(&session)?).await? {
                    debug!("Session removed while being renewed");
                    return Ok(None);
                }
                Ok(Some(session))
            }
            None => {
                debug!("Session key missing or expired in Redis");
                Ok(None)
            }
        }
    }

    async fn get(&self, token: &str, _now: DateTime<Utc>) -> CacheResult<Option<Session>> {
        self.redis_pool
            .get(&session_key(token))
            .await?
            .map(|raw| decode(&raw))
            .transpose()
    }

    async fn remove(&self, token: &str) -> CacheResult<()> {
        self.redis_pool.delete(&session_key(token)).await
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> CacheResult<usize> {
        // Redis expires keys on its own
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::RedisConfig;
    use uuid::Uuid;

    #[test]
    fn test_key_layout() {
        assert_eq!(session_key("abc"), "session:abc");
    }

    #[test]
    fn test_ttl_is_at_least_one_second() {
        assert_eq!(ttl_seconds(Duration::hours(24)), 86_400);
        assert_eq!(ttl_seconds(Duration::milliseconds(10)), 1);
    }

    #[test]
    fn test_encoded_session_decodes_to_itself() {
        let now = Utc::now();
        let session = Session::new("tok".into(), Uuid::new_v4(), now, Duration::hours(1));
        assert_eq!(decode(&encode(&session).unwrap()).unwrap(), session);
    }

    #[test]
    fn test_corrupt_value_is_a_serialization_error() {
        assert!(matches!(
            decode("{not json"),
            Err(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_touch_after_remove_does_not_resurrect() -> CacheResult<()> {
        let store = RedisSessionStore::new(RedisPool::new(&RedisConfig::from_env()?)?);
        let now = Utc::now();
        let ttl = Duration::minutes(5);
        let session = Session::new(
            format!("test-{}", Uuid::new_v4()),
            Uuid::new_v4(),
            now,
            ttl,
        );

        store.insert(&session, ttl).await?;
        let later = now + Duration::minutes(1);
        let touched = store.touch(&session.token, later, ttl).await?;
        assert_eq!(touched.map(|s| s.account_id), Some(session.account_id));

        let stored = store.get(&session.token, later).await?.unwrap();
        assert_eq!(stored.created_at, session.created_at);
        assert_eq!(stored.last_accessed_at, later);
        assert_eq!(stored.expires_at, later + ttl);

        store.remove(&session.token).await?;
        store.remove(&session.token).await?;
        assert!(store.touch(&session.token, now, ttl).await?.is_none());
        assert!(store.get(&session.token, now).await?.is_none());

        Ok(())
    }
}
