//! Signed-token glue: access, refresh, and password-reset tokens.
//!
//! All three kinds are HS256 JWTs signed with the same secret but carrying
//! a `purpose` claim. Verification rejects a token presented for the wrong
//! purpose, so an access token can never stand in for a refresh token or a
//! reset token, and vice versa.
//!
//! Raw token values never touch the durable store; sessions and the
//! blacklist hold SHA-256 digests produced by [`hash_token`].

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::error;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::model::{Role, Status, User};

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
    Reset,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub status: Status,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by refresh and reset tokens: just the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectClaims {
    pub sub: Uuid,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

/// Digest of a token value for storage and lookups. The raw value is only
/// ever held by the client.
#[must_use]
pub fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Mints and verifies the three token kinds.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    reset_ttl_seconds: i64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret().clone(),
            access_ttl_seconds: config.access_token_ttl_seconds(),
            refresh_ttl_seconds: config.refresh_token_ttl_seconds(),
            reset_ttl_seconds: config.reset_token_ttl_seconds(),
        }
    }

    /// Mint an access token embedding the user's id, email, role, and
    /// status.
    pub fn sign_access(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            purpose: TokenPurpose::Access,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl_seconds)).timestamp(),
        };
        self.sign(&claims)
    }

    /// Mint a refresh token carrying only the user id.
    pub fn sign_refresh(&self, user_id: Uuid) -> Result<String> {
        self.sign_subject(user_id, TokenPurpose::Refresh, self.refresh_ttl_seconds)
    }

    /// Mint a password-reset token carrying only the user id.
    pub fn sign_reset(&self, user_id: Uuid) -> Result<String> {
        self.sign_subject(user_id, TokenPurpose::Reset, self.reset_ttl_seconds)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims> {
        let claims: AccessClaims = self.verify(token)?;
        if claims.purpose != TokenPurpose::Access {
            return Err(Error::InvalidToken);
        }
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<SubjectClaims> {
        self.verify_subject(token, TokenPurpose::Refresh)
    }

    pub fn verify_reset(&self, token: &str) -> Result<SubjectClaims> {
        self.verify_subject(token, TokenPurpose::Reset)
    }

    fn sign_subject(&self, user_id: Uuid, purpose: TokenPurpose, ttl_seconds: i64) -> Result<String> {
        let now = Utc::now();
        let claims = SubjectClaims {
            sub: user_id,
            purpose,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        };
        self.sign(&claims)
    }

    fn verify_subject(&self, token: &str, purpose: TokenPurpose) -> Result<SubjectClaims> {
        let claims: SubjectClaims = self.verify(token)?;
        if claims.purpose != purpose {
            return Err(Error::InvalidToken);
        }
        Ok(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|err| {
            error!("token signing failed: {err}");
            Error::Internal("token signing failed".to_string())
        })
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<T>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"***")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("reset_ttl_seconds", &self.reset_ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&AuthConfig::new(SecretString::from("test-secret".to_string())))
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            password_hash: String::new(),
            role: Role::Standard,
            status: Status::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let signer = signer();
        let user = user();
        let token = signer.sign_access(&user).unwrap();
        let claims = signer.verify_access(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Standard);
        assert_eq!(claims.status, Status::Active);
    }

    #[test]
    fn purposes_cannot_be_swapped() {
        let signer = signer();
        let user = user();
        let access = signer.sign_access(&user).unwrap();
        let refresh = signer.sign_refresh(user.id).unwrap();
        let reset = signer.sign_reset(user.id).unwrap();

        assert!(matches!(
            signer.verify_refresh(&access),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            signer.verify_access(&refresh),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            signer.verify_refresh(&reset),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            signer.verify_reset(&refresh),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::new(SecretString::from("test-secret".to_string()))
            .with_refresh_token_ttl_seconds(-300);
        let signer = TokenSigner::new(&config);
        let token = signer.sign_refresh(Uuid::new_v4()).unwrap();
        assert!(matches!(
            signer.verify_refresh(&token),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = signer();
        let other = TokenSigner::new(&AuthConfig::new(SecretString::from("other-secret".to_string())));
        let token = signer.sign_refresh(Uuid::new_v4()).unwrap();
        assert!(matches!(
            other.verify_refresh(&token),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(matches!(
            signer().verify_access("not-a-token"),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn hash_token_is_stable_and_distinct() {
        assert_eq!(hash_token("token"), hash_token("token"));
        assert_ne!(hash_token("token"), hash_token("other"));
        assert_eq!(hash_token("token").len(), 32);
    }
}
