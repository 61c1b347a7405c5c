//! Cache-aside access to user records.
//!
//! Reads go to the cache first and fall back to the durable store; writes
//! go to the durable store first and then invalidate the cached entry
//! rather than updating it in place, so a stale write can never resurrect
//! an old value. Every cache failure is swallowed: the durable store is
//! the source of truth and the cache is best-effort.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{Cache, USER_LIST_KEY, user_key};
use crate::error::{Error, Result};
use crate::model::User;
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn Cache>,
    cache_ttl: Duration,
}

impl UserRepository {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn Cache>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    /// Insert a new user. The list cache entry is dropped so the next
    /// `list` repopulates from the durable store.
    pub async fn create(&self, user: &User) -> Result<()> {
        self.store.create(user).await?;
        self.invalidate(USER_LIST_KEY).await;
        Ok(())
    }

    /// Cache-aside point lookup. Not-found is an error and is never
    /// cached as a negative result.
    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let key = user_key(id);
        if let Some(user) = self.cached::<User>(&key).await {
            return Ok(user);
        }

        let user = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;
        self.populate(&key, &user).await;
        Ok(user)
    }

    /// Always reads the durable store; uniqueness decisions must observe
    /// the latest committed state.
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.store
            .get_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))
    }

    /// Always reads the durable store, for the same reason as
    /// [`Self::get_by_email`].
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        self.store.exists_by_email(email).await
    }

    /// Write-invalidate update.
    pub async fn update(&self, user: &User) -> Result<()> {
        self.store.update(user).await?;
        self.invalidate(&user_key(user.id)).await;
        self.invalidate(USER_LIST_KEY).await;
        Ok(())
    }

    /// Write-invalidate delete.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        self.invalidate(&user_key(id)).await;
        self.invalidate(USER_LIST_KEY).await;
        Ok(())
    }

    /// Cache-aside over the full collection.
    pub async fn list(&self) -> Result<Vec<User>> {
        if let Some(users) = self.cached::<Vec<User>>(USER_LIST_KEY).await {
            return Ok(users);
        }

        let users = self.store.list().await?;
        self.populate(USER_LIST_KEY, &users).await;
        Ok(users)
    }

    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(err) => {
                    // Undecodable entries are dropped so the next read
                    // repopulates from the durable store.
                    debug!("dropping undecodable cache entry {key}: {err}");
                    self.invalidate(key).await;
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                debug!("cache read for {key} failed: {err}");
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(payload) => {
                if let Err(err) = self.cache.set(key, payload, self.cache_ttl).await {
                    debug!("cache write for {key} failed: {err}");
                }
            }
            Err(err) => debug!("cache serialization for {key} failed: {err}"),
        }
    }

    async fn invalidate(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            // At worst the next read serves one stale value before the
            // durable store repopulates the entry.
            warn!("cache invalidation for {key} failed: {err}");
        }
    }
}

impl std::fmt::Debug for UserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepository")
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}
