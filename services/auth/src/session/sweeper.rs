//! Background sweep of expired sessions

use tokio::time::{Duration, interval};
use tracing::{debug, error, info};

use super::SessionManager;

/// Periodically drops expired sessions from the session store
pub struct SessionSweeper {
    sessions: SessionManager,
    interval_seconds: u64,
}

impl SessionSweeper {
    /// Create a new sweeper
    pub fn new(sessions: SessionManager, interval_seconds: u64) -> Self {
        Self {
            sessions,
            interval_seconds,
        }
    }

    /// Start the background sweep task
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting session sweeper (interval: {}s)",
            self.interval_seconds
        );

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(self.interval_seconds.max(1)));
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match self.sessions.sweep_expired().await {
                    Ok(0) => debug!("Session sweep completed: nothing to remove"),
                    Ok(removed) => info!("Session sweep removed {} expired sessions", removed),
                    Err(e) => error!("Session sweep failed: {}", e),
                }
            }
        })
    }
}
