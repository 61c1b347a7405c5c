//! Service layer: the auth and user orchestrators plus shared input
//! validation.

mod auth;
mod user;

pub use auth::AuthService;
pub use user::UserService;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{NewUser, Role, Status, User};
use crate::password::{self, MIN_PASSWORD_LENGTH};
use crate::repo::UserRepository;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate, hash, and persist a new user. Shared by registration and the
/// admin user-creation path; no tokens are issued here.
pub(crate) async fn create_user(users: &UserRepository, new: NewUser) -> Result<User> {
    let email = normalize_email(&new.email);
    if !valid_email(&email) {
        return Err(Error::Validation("invalid email address".to_string()));
    }
    validate_password(&new.password)?;

    if users.exists_by_email(&email).await? {
        return Err(Error::Duplicate("email already registered".to_string()));
    }

    let now = chrono::Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4(),
        email,
        first_name: new.first_name,
        last_name: new.last_name,
        password_hash: password::hash(&new.password)?,
        role: new.role.unwrap_or(Role::Standard),
        status: new.status.unwrap_or(Status::Active),
        created_at: now,
        updated_at: now,
    };
    users.create(&user).await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, valid_email, validate_password};
    use crate::error::Error;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(Error::Validation(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }
}
