//! Key-value cache used read-through/write-invalidate for user records.
//!
//! The cache is advisory: the durable store is always the source of truth,
//! and callers swallow cache failures rather than surfacing them.

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

/// Cache key for a single user record.
#[must_use]
pub fn user_key(id: Uuid) -> String {
    format!("user:{id}")
}

/// Cache key for the full user list. Disjoint from per-user keys so a list
/// refresh can never collide with or shadow an individual record.
pub const USER_LIST_KEY: &str = "users:all";

/// Key-value store with per-entry TTL. Values are serialized JSON.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a value. `Ok(None)` is a miss; expired entries are misses.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value with a TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Drop a value. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
