//! Domain error kinds shared across repositories and services.

use thiserror::Error;

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the auth and user services.
///
/// Repository-level store failures are wrapped into [`Error::Internal`]
/// with an opaque message unless they map to a more specific kind; the raw
/// store error text is logged at the repository layer and never handed to
/// callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown email or wrong password. Both cases collapse into this one
    /// kind so callers cannot distinguish them.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but its status does not permit login or refresh.
    #[error("account is inactive")]
    AccountInactive,

    /// Malformed, expired, wrong-purpose, or blacklisted token.
    #[error("invalid token")]
    InvalidToken,

    /// Missing, expired, or already-rotated session.
    #[error("invalid session")]
    InvalidSession,

    /// Unique-constraint violation, e.g. an already-registered email.
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected input, e.g. a malformed email or a too-short password.
    #[error("validation: {0}")]
    Validation(String),

    /// Unexpected store or primitive failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error is the caller's fault rather than the service's.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_is_opaque_for_internal() {
        let err = Error::Internal("failed to save session".to_string());
        assert_eq!(err.to_string(), "internal error: failed to save session");
    }

    #[test]
    fn client_error_classification() {
        assert!(Error::InvalidCredentials.is_client_error());
        assert!(Error::Duplicate("email".into()).is_client_error());
        assert!(!Error::Internal("db down".into()).is_client_error());
    }
}
