//! Credential/session lifecycle orchestration.
//!
//! Flow overview:
//! 1) Registration persists an identity; no tokens are issued.
//! 2) Login mints an access+refresh pair, records the issuance, and opens
//!    a session keyed by the refresh-token digest.
//! 3) Refresh rotates the session in place; the previous refresh token
//!    stops matching the moment the rotation commits.
//! 4) Logout deletes the session and blacklists the presented token until
//!    its natural expiry would have passed.
//! 5) Password reset revokes every session the user holds.
//!
//! The service holds no locks and no cross-request state; all coordination
//! happens through the stores.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{create_user, normalize_email, validate_password};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::model::{BlacklistEntry, NewUser, Session, TokenPair, TokenRecord, User};
use crate::password;
use crate::repo::UserRepository;
use crate::store::AuthStore;
use crate::token::{AccessClaims, TokenSigner, hash_token};

pub struct AuthService {
    users: UserRepository,
    auth: Arc<dyn AuthStore>,
    signer: TokenSigner,
    config: AuthConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(users: UserRepository, auth: Arc<dyn AuthStore>, config: AuthConfig) -> Self {
        Self {
            users,
            auth,
            signer: TokenSigner::new(&config),
            config,
        }
    }

    /// Register a new account. Login is a separate step; nothing is
    /// issued here.
    pub async fn register(&self, new: NewUser) -> Result<User> {
        let user = create_user(&self.users, new).await?;
        info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Authenticate and open a session.
    ///
    /// Unknown email and wrong password collapse into
    /// [`Error::InvalidCredentials`]; password comparison is constant-time
    /// at the bcrypt level. Concurrent logins are independent: each call
    /// creates its own session.
    pub async fn login(
        &self,
        email: &str,
        raw_password: &str,
        user_agent: &str,
        client_ip: &str,
    ) -> Result<TokenPair> {
        let email = normalize_email(email);
        let user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(Error::NotFound(_)) => return Err(Error::InvalidCredentials),
            Err(err) => return Err(err),
        };

        if !password::verify(raw_password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        if !user.is_active() {
            return Err(Error::AccountInactive);
        }

        let pair = self.issue_pair(&user).await?;

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            refresh_token_hash: hash_token(&pair.refresh_token),
            user_agent: user_agent.to_string(),
            client_ip: client_ip.to_string(),
            expires_at: now + Duration::seconds(self.config.session_ttl_seconds()),
            created_at: now,
        };
        self.auth.create_session(&session).await?;

        info!(user_id = %user.id, session_id = %session.id, "login");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, rotating the session.
    ///
    /// Presenting the same refresh token twice is only valid the first
    /// time: rotation replaces the stored digest, so the loser of a
    /// concurrent race observes [`Error::InvalidSession`].
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.signer.verify_refresh(refresh_token)?;

        let presented_hash = hash_token(refresh_token);
        let session = self
            .auth
            .get_session_by_refresh_token(&presented_hash)
            .await?
            .ok_or(Error::InvalidSession)?;
        if !session.is_valid() {
            return Err(Error::InvalidSession);
        }

        let user = self.users.get_by_id(claims.sub).await?;
        if !user.is_active() {
            return Err(Error::AccountInactive);
        }

        let pair = self.issue_pair(&user).await?;

        let rotated = self
            .auth
            .update_session(
                session.id,
                &presented_hash,
                &hash_token(&pair.refresh_token),
                Utc::now() + Duration::seconds(self.config.session_ttl_seconds()),
            )
            .await?;
        if !rotated {
            // lost the rotation race, or the session was deleted in between
            return Err(Error::InvalidSession);
        }

        info!(user_id = %user.id, session_id = %session.id, "rotated session");
        Ok(pair)
    }

    /// Revoke a token and end its session.
    ///
    /// The session lookup is best-effort (absence is not an error); the
    /// blacklist entry is always written so the token cannot be replayed
    /// while its signature remains valid.
    pub async fn logout(&self, token: &str) -> Result<()> {
        if self.signer.verify_access(token).is_err() && self.signer.verify_refresh(token).is_err() {
            return Err(Error::InvalidToken);
        }

        let token_hash = hash_token(token);
        match self.auth.get_session_by_refresh_token(&token_hash).await {
            Ok(Some(session)) => self.auth.delete_session(session.id).await?,
            Ok(None) => {}
            Err(err) => warn!("session lookup during logout failed: {err}"),
        }

        self.auth
            .add_to_blacklist(&BlacklistEntry {
                token_hash,
                expires_at: Utc::now() + Duration::seconds(self.config.blacklist_ttl_seconds()),
            })
            .await?;
        Ok(())
    }

    /// Mint a password-reset token for out-of-band delivery.
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let email = normalize_email(email);
        let user = self.users.get_by_email(&email).await?;
        self.signer.sign_reset(user.id)
    }

    /// Set a new password and revoke every session the user holds.
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<()> {
        let claims = self.signer.verify_reset(reset_token)?;
        validate_password(new_password)?;

        let mut user = self.users.get_by_id(claims.sub).await?;
        user.password_hash = password::hash(new_password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        // every existing login must die with the old password
        for session in self.auth.get_sessions_by_user_id(user.id).await? {
            self.auth.delete_session(session.id).await?;
        }

        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Check a presented access token.
    ///
    /// The blacklist is consulted before the signature: a revoked token is
    /// invalid even while its signature and embedded expiry still check
    /// out.
    pub async fn validate_token(&self, token: &str) -> Result<AccessClaims> {
        if self.auth.is_token_blacklisted(&hash_token(token)).await? {
            return Err(Error::InvalidToken);
        }
        self.signer.verify_access(token)
    }

    /// Remove expired token records and sessions. Blacklist entries are
    /// left alone; membership checks already ignore them once their own
    /// expiry passes.
    pub async fn cleanup_expired_data(&self) -> Result<()> {
        let tokens = self.auth.cleanup_expired_tokens().await?;
        let sessions = self.auth.cleanup_expired_sessions().await?;
        info!(tokens, sessions, "cleaned up expired auth data");
        Ok(())
    }

    async fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let access_token = self.signer.sign_access(user)?;
        let refresh_token = self.signer.sign_refresh(user.id)?;

        self.auth
            .save_token(&TokenRecord {
                user_id: user.id,
                access_token_hash: hash_token(&access_token),
                refresh_token_hash: hash_token(&refresh_token),
                expires_at: Utc::now()
                    + Duration::seconds(self.config.token_record_ttl_seconds()),
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
