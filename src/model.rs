//! Core entities: users, issued-token records, sessions, and blacklist
//! entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

/// Account status. Only `active` accounts may log in or refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

/// Identity record owned by the durable store and mirrored by the cache.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// bcrypt hash; the raw password is never stored.
    pub password_hash: String,
    pub role: Role,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True when the account may log in or refresh tokens.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// Input for registering or creating a user. The password arrives raw and
/// is hashed before anything is persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Defaults to [`Role::Standard`] when not set.
    pub role: Option<Role>,
    /// Defaults to [`Status::Active`] when not set.
    pub status: Option<Status>,
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

/// Audit row written once per token issuance (login and each refresh).
///
/// Rows are superseded, never mutated; expired rows are removed only by
/// scheduled cleanup. Only digests of the issued tokens are stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRecord {
    pub user_id: Uuid,
    pub access_token_hash: Vec<u8>,
    pub refresh_token_hash: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// Server-side record of a login.
///
/// Created on login, rotated in place on refresh, deleted on logout or
/// password reset. The refresh token is stored as a digest; lookups and
/// the rotation compare-and-swap both operate on the digest.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: Vec<u8>,
    pub user_agent: String,
    pub client_ip: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid only while its expiry is in the future. Deleted
    /// or rotated-away sessions never reach this check: lookup is by the
    /// current refresh-token digest, so they simply fail to match.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Revocation record overriding an otherwise-valid token signature.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlacklistEntry {
    pub token_hash: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// Access + refresh pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token_hash: vec![1, 2, 3],
            user_agent: "test-agent".to_string(),
            client_ip: "127.0.0.1".to_string(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn session_validity_follows_expiry() {
        assert!(session(Utc::now() + Duration::hours(1)).is_valid());
        assert!(!session(Utc::now() - Duration::seconds(1)).is_valid());
    }

    #[test]
    fn role_and_status_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Status::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn user_active_check() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password_hash: String::new(),
            role: Role::Standard,
            status: Status::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(user.is_active());
        user.status = Status::Inactive;
        assert!(!user.is_active());
    }
}
