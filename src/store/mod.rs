//! Durable-store capability traits and their implementations.
//!
//! One trait per repository concern: [`UserStore`] for identity records,
//! [`AuthStore`] for token/session/blacklist bookkeeping. Each has a
//! Postgres implementation and a mutex-guarded in-memory double with the
//! same semantics, selected by ordinary trait-object polymorphism.

mod memory;
mod postgres;

pub use memory::{MemoryAuthStore, MemoryUserStore};
pub use postgres::{PgAuthStore, PgUserStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{BlacklistEntry, Session, TokenRecord, User};

/// Durable persistence for user records.
///
/// Point lookups return `Ok(None)` for absent rows; the cache-aside
/// repository layer decides whether absence is an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. A unique-constraint violation on the email
    /// surfaces as [`crate::Error::Duplicate`].
    async fn create(&self, user: &User) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Always reads committed state; uniqueness checks depend on it.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Full-row update of the mutable columns.
    async fn update(&self, user: &User) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn list(&self) -> Result<Vec<User>>;
}

/// Durable persistence for issued tokens, sessions, and the revocation
/// blacklist. No cache layer sits in front of this contract: these
/// lookups are security-sensitive and must always reflect committed state.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Append an issued-token audit row. Rows are never mutated.
    async fn save_token(&self, record: &TokenRecord) -> Result<()>;

    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Look up a session by the digest of its current refresh token.
    async fn get_session_by_refresh_token(
        &self,
        refresh_token_hash: &[u8],
    ) -> Result<Option<Session>>;

    /// Rotate a session's refresh token, conditioned on the previous
    /// digest still matching. Returns `false` when the compare-and-swap
    /// loses the race (the session was rotated or deleted concurrently).
    async fn update_session(
        &self,
        id: Uuid,
        previous_hash: &[u8],
        new_hash: &[u8],
        expires_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Delete a session. Deleting an absent session is not an error.
    async fn delete_session(&self, id: Uuid) -> Result<()>;

    async fn get_sessions_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>>;

    async fn add_to_blacklist(&self, entry: &BlacklistEntry) -> Result<()>;

    /// Membership check over non-expired entries only; expired entries
    /// are inert even before cleanup removes them.
    async fn is_token_blacklisted(&self, token_hash: &[u8]) -> Result<bool>;

    /// Remove expired token records. Idempotent; returns rows removed.
    async fn cleanup_expired_tokens(&self) -> Result<u64>;

    /// Remove expired sessions. Idempotent; returns rows removed.
    async fn cleanup_expired_sessions(&self) -> Result<u64>;
}
