//! Session cache
//!
//! Persists the logged-in [`Session`] in Redis under a single key so that a
//! restarted client can pick it back up.

use redis::AsyncCommands;
use tracing::{debug, error, warn};
use crate::config::SessionConfig;
use crate::models::account::Session;
use crate::utils::errors::Result;

/// Redis-backed storage for the current session
#[derive(Clone)]
pub struct SessionCache {
    connection_manager: redis::aio::ConnectionManager,
    config: SessionConfig,
}

impl SessionCache {
    /// Connect to Redis
    pub async fn new(config: SessionConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Full Redis key of the session entry
    pub fn key(&self) -> String {
        session_key(&self.config)
    }

    /// Store the session with the configured TTL
    pub async fn save(&self, session: &Session) -> Result<()> {
        let key = self.key();
        let serialized = serde_json::to_string(session)?;
        let mut conn = self.connection_manager.clone();

        match conn.set_ex::<_, _, ()>(&key, serialized, self.config.ttl_seconds).await {
            Ok(_) => {
                debug!(key = %key, user_id = %session.user_id, "Session saved");
                Ok(())
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to save session");
                Err(e.into())
            }
        }
    }

    /// Load the cached session; an unreadable entry is dropped
    pub async fn load(&self) -> Result<Option<Session>> {
        let key = self.key();
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;
        let Some(data) = serialized else {
            debug!(key = %key, "No cached session");
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&data) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable cached session");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Remove the cached session
    pub async fn clear(&self) -> Result<()> {
        let key = self.key();
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(&key).await?;
        debug!(key = %key, deleted = deleted, "Session cleared");
        Ok(())
    }

    /// Ping Redis
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

fn session_key(config: &SessionConfig) -> String {
    format!("{}{}", config.prefix, config.key)
}
