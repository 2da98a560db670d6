//! Revoked admin token ids
//!
//! Entries only need to outlive the token they revoke, so both backends
//! store them with an expiry.

use anyhow::Result;
use common::cache::RedisPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub enum RevocationList {
    Redis(RedisPool),
    Memory(Arc<Mutex<HashMap<Uuid, Instant>>>),
}

impl RevocationList {
    pub fn in_memory() -> Self {
        RevocationList::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    fn key(jti: Uuid) -> String {
        format!("revoked_admin_token:{}", jti)
    }

    /// Mark a token id revoked for `ttl_secs`
    pub async fn revoke(&self, jti: Uuid, ttl_secs: u64) -> Result<()> {
        // Redis rejects SETEX with a zero TTL; the token is dead by then anyway.
        let ttl_secs = ttl_secs.max(1);
        match self {
            RevocationList::Redis(pool) => pool.set(&Self::key(jti), "1", Some(ttl_secs)).await,
            RevocationList::Memory(entries) => {
                let now = Instant::now();
                let mut entries = entries.lock().await;
                entries.retain(|_, expires| *expires > now);
                entries.insert(jti, now + Duration::from_secs(ttl_secs));
                Ok(())
            }
        }
    }

    /// Check whether a token id has been revoked
    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool> {
        match self {
            RevocationList::Redis(pool) => pool.exists(&Self::key(jti)).await,
            RevocationList::Memory(entries) => {
                let entries = entries.lock().await;
                Ok(entries
                    .get(&jti)
                    .is_some_and(|expires| *expires > Instant::now()))
            }
        }
    }
}
