//! Redis cache module
//!
//! Thin async wrapper over a multiplexed Redis connection providing the
//! key/value operations the services need, all with optional TTL support.

use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::info;

use crate::error::{CacheError, CacheResult};

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> CacheResult<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

/// Redis connection handle
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Create a new Redis handle. No connection is opened until first use.
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.clone()).map_err(CacheError::Connection)?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> CacheResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::Connection)
    }

    /// Set a key-value pair in Redis with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;

        if let Some(ttl) = ttl_seconds {
            let _: () = conn
                .set_ex(key, value, ttl)
                .await
                .map_err(CacheError::Command)?;
        } else {
            let _: () = conn.set(key, value).await.map_err(CacheError::Command)?;
        }

        Ok(())
    }

    /// Get a value from Redis by key
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        conn.get(key).await.map_err(CacheError::Command)
    }

    /// Get a value and reset its TTL in one atomic `GETEX` command.
    ///
    /// Returns `None` without creating the key when it does not exist.
    pub async fn get_and_expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        redis::cmd("GETEX")
            .arg(key)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(CacheError::Command)
    }

    /// Overwrite an existing key, keeping its TTL (`SET .. XX KEEPTTL`).
    ///
    /// Returns `false` and writes nothing when the key does not exist.
    pub async fn replace_keep_ttl(&self, key: &str, value: &str) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::Command)?;
        Ok(reply.is_some())
    }

    /// Delete a key from Redis. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await.map_err(CacheError::Command)?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::Command)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_defaults() {
        unsafe {
            std::env::remove_var("REDIS_URL");
        }

        let config = RedisConfig::from_env().unwrap();
        assert_eq!(config.url, "redis://localhost:6379");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = RedisConfig {
            url: "not a redis url".to_string(),
        };
        assert!(matches!(
            RedisPool::new(&config),
            Err(CacheError::Connection(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_set_get_expire_delete() -> CacheResult<()> {
        let pool = RedisPool::new(&RedisConfig::from_env()?)?;
        assert!(pool.health_check().await?);

        let key = "common_cache_test_key";
        pool.set(key, "value", Some(5)).await?;
        assert_eq!(pool.get(key).await?, Some("value".to_string()));
        assert_eq!(
            pool.get_and_expire(key, 10).await?,
            Some("value".to_string())
        );

        assert!(pool.replace_keep_ttl(key, "renewed").await?);
        assert_eq!(pool.get(key).await?, Some("renewed".to_string()));

        pool.delete(key).await?;
        assert_eq!(pool.get(key).await?, None);
        assert_eq!(pool.get_and_expire(key, 10).await?, None);
        assert!(!pool.replace_keep_ttl(key, "late").await?);
        assert_eq!(pool.get(key).await?, None);

        Ok(())
    }
}
