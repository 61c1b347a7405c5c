//! Auth configuration.
//!
//! All lifetimes live here so embedding code constructs one value and
//! passes it to the components that need it; nothing reads process-wide
//! mutable state.

use secrecy::SecretString;
use std::time::Duration;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 30 * 60;
const DEFAULT_TOKEN_RECORD_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_BLACKLIST_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_USER_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Lifetimes and signing secret for the credential/session lifecycle.
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
    token_record_ttl_seconds: i64,
    session_ttl_seconds: i64,
    blacklist_ttl_seconds: i64,
    user_cache_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
            token_record_ttl_seconds: DEFAULT_TOKEN_RECORD_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            blacklist_ttl_seconds: DEFAULT_BLACKLIST_TTL_SECONDS,
            user_cache_ttl_seconds: DEFAULT_USER_CACHE_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_record_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_record_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_blacklist_ttl_seconds(mut self, seconds: i64) -> Self {
        self.blacklist_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_user_cache_ttl_seconds(mut self, seconds: u64) -> Self {
        self.user_cache_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn reset_token_ttl_seconds(&self) -> i64 {
        self.reset_token_ttl_seconds
    }

    #[must_use]
    pub fn token_record_ttl_seconds(&self) -> i64 {
        self.token_record_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn blacklist_ttl_seconds(&self) -> i64 {
        self.blacklist_ttl_seconds
    }

    /// TTL for cached user records, as a std `Duration` for the cache layer.
    #[must_use]
    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.user_cache_ttl_seconds)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("reset_token_ttl_seconds", &self.reset_token_ttl_seconds)
            .field("token_record_ttl_seconds", &self.token_record_ttl_seconds)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("blacklist_ttl_seconds", &self.blacklist_ttl_seconds)
            .field("user_cache_ttl_seconds", &self.user_cache_ttl_seconds)
            .finish()
    }
}
