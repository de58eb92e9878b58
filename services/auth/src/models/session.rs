//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token carried in the session cookie
    pub token: String,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session at `now`
    pub fn new(token: String, account_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token,
            account_id,
            created_at: now,
            last_accessed_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the TTL window has elapsed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Slide the expiry window forward from `now`
    pub fn renew(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.last_accessed_at = now;
        self.expires_at = now + ttl;
    }
}
