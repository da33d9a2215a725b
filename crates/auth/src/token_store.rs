//! Refresh token storage with expiry.
//!
//! Redis is used when a connection is available; otherwise tokens live in an
//! in-process map with the same single-use semantics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use redis::aio::ConnectionManager;
use tokio::sync::Mutex;
use tracing::debug;

use crate::AuthError;

const KEY_PREFIX: &str = "reservo:refresh:";

#[derive(Clone)]
pub enum TokenStore {
    Redis(ConnectionManager),
    Memory(MemoryTokenStore),
}

impl TokenStore {
    pub fn redis(manager: ConnectionManager) -> Self {
        TokenStore::Redis(manager)
    }

    pub fn in_memory() -> Self {
        TokenStore::Memory(MemoryTokenStore::default())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            TokenStore::Redis(_) => "redis",
            TokenStore::Memory(_) => "memory",
        }
    }

    /// Store `subject` under `token` for `ttl`
    pub async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<(), AuthError> {
        match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.clone();
                redis::cmd("SET")
                    .arg(key(token))
                    .arg(subject)
                    .arg("EX")
                    .arg(ttl.as_secs().max(1))
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(|err| AuthError::TokenStore(err.to_string()))
            }
            TokenStore::Memory(store) => {
                store.put(token, subject, ttl).await;
                Ok(())
            }
        }
    }

    /// Remove and return the subject stored under `token`, if it has not expired
    pub async fn take(&self, token: &str) -> Result<Option<String>, AuthError> {
        match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.clone();
                redis::cmd("GETDEL")
                    .arg(key(token))
                    .query_async::<_, Option<String>>(&mut conn)
                    .await
                    .map_err(|err| AuthError::TokenStore(err.to_string()))
            }
            TokenStore::Memory(store) => Ok(store.take(token).await),
        }
    }

    /// Subject stored under `token` without consuming it
    pub async fn subject(&self, token: &str) -> Result<Option<String>, AuthError> {
        match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.clone();
                redis::cmd("GET")
                    .arg(key(token))
                    .query_async::<_, Option<String>>(&mut conn)
                    .await
                    .map_err(|err| AuthError::TokenStore(err.to_string()))
            }
            TokenStore::Memory(store) => Ok(store.subject(token).await),
        }
    }

    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.clone();
                let removed = redis::cmd("DEL")
                    .arg(key(token))
                    .query_async::<_, i64>(&mut conn)
                    .await
                    .map_err(|err| AuthError::TokenStore(err.to_string()))?;
                debug!(removed, "refresh token revoked");
                Ok(())
            }
            TokenStore::Memory(store) => {
                store.take(token).await;
                Ok(())
            }
        }
    }
}

fn key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryTokenStore {
    async fn put(&self, token: &str, subject: &str, ttl: Duration) {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard);
        guard.insert(token.to_string(), (subject.to_string(), Instant::now() + ttl));
    }

    async fn take(&self, token: &str) -> Option<String> {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard);
        guard.remove(token).map(|(subject, _)| subject)
    }

    async fn subject(&self, token: &str) -> Option<String> {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard);
        guard.get(token).map(|(subject, _)| subject.clone())
    }

    pub async fn len(&self) -> usize {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard);
        guard.len()
    }

    fn prune(map: &mut HashMap<String, (String, Instant)>) {
        let now = Instant::now();
        map.retain(|_, (_, expires_at)| *expires_at > now);
    }
}
