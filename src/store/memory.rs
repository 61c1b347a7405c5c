//! In-memory store doubles.
//!
//! Same contracts and semantics as the Postgres implementations, including
//! the email unique constraint and the session-rotation compare-and-swap
//! (performed under the store mutex, mirroring the conditional UPDATE).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AuthStore, UserStore};
use crate::error::{Error, Result};
use crate::model::{BlacklistEntry, Session, TokenRecord, User};

/// [`UserStore`] over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(Error::Duplicate("email already registered".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .any(|user| user.email == email))
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(Error::Duplicate("email already registered".to_string()));
        }
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(Error::NotFound("user not found".to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.lock().await.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().await.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

/// [`AuthStore`] over mutex-guarded collections.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    tokens: Mutex<Vec<TokenRecord>>,
    sessions: Mutex<HashMap<Uuid, Session>>,
    blacklist: Mutex<Vec<BlacklistEntry>>,
}

impl MemoryAuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of issued-token audit rows held for a user.
    pub async fn token_record_count(&self, user_id: Uuid) -> usize {
        self.tokens
            .lock()
            .await
            .iter()
            .filter(|record| record.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn save_token(&self, record: &TokenRecord) -> Result<()> {
        self.tokens.lock().await.push(record.clone());
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .lock()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session_by_refresh_token(
        &self,
        refresh_token_hash: &[u8],
    ) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .await
            .values()
            .find(|session| session.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    async fn update_session(
        &self,
        id: Uuid,
        previous_hash: &[u8],
        new_hash: &[u8],
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(session) if session.refresh_token_hash == previous_hash => {
                session.refresh_token_hash = new_hash.to_vec();
                session.expires_at = expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        self.sessions.lock().await.remove(&id);
        Ok(())
    }

    async fn get_sessions_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>> {
        Ok(self
            .sessions
            .lock()
            .await
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_to_blacklist(&self, entry: &BlacklistEntry) -> Result<()> {
        let mut blacklist = self.blacklist.lock().await;
        blacklist.retain(|existing| existing.token_hash != entry.token_hash);
        blacklist.push(entry.clone());
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_hash: &[u8]) -> Result<bool> {
        let now = Utc::now();
        Ok(self
            .blacklist
            .lock()
            .await
            .iter()
            .any(|entry| entry.token_hash == token_hash && entry.expires_at > now))
    }

    async fn cleanup_expired_tokens(&self) -> Result<u64> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|record| record.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, session| session.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
