//! User CRUD over the cache-aside repository.

use tracing::info;
use uuid::Uuid;

use super::{create_user, normalize_email, valid_email};
use crate::error::{Error, Result};
use crate::model::{NewUser, User, UserUpdate};
use crate::repo::UserRepository;

#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    #[must_use]
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn create(&self, new: NewUser) -> Result<User> {
        let user = create_user(&self.users, new).await?;
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        self.users.get_by_id(id).await
    }

    /// Apply a partial update. A changed email must not belong to another
    /// user; the check reads committed state, never the cache.
    pub async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User> {
        let mut user = self.users.get_by_id(id).await?;

        if let Some(email) = update.email {
            let email = normalize_email(&email);
            if !valid_email(&email) {
                return Err(Error::Validation("invalid email address".to_string()));
            }
            if email != user.email {
                if self.users.exists_by_email(&email).await? {
                    return Err(Error::Duplicate(
                        "email already registered to another user".to_string(),
                    ));
                }
                user.email = email;
            }
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }

        user.updated_at = chrono::Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        // resolve first so callers get not-found instead of a silent no-op
        let user = self.users.get_by_id(id).await?;
        self.users.delete(user.id).await?;
        info!(user_id = %user.id, "deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::model::{Role, Status};
    use crate::store::MemoryUserStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn service() -> UserService {
        let users = UserRepository::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
        );
        UserService::new(users)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "a strong password".to_string(),
            role: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_role_and_status() {
        let service = service();
        let user = service.create(new_user("a@example.com")).await.unwrap();
        assert_eq!(user.role, Role::Standard);
        assert_eq!(user.status, Status::Active);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let service = service();
        service.create(new_user("a@example.com")).await.unwrap();
        assert!(matches!(
            service.create(new_user("a@example.com")).await,
            Err(Error::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let service = service();
        service.create(new_user("a@example.com")).await.unwrap();
        let other = service.create(new_user("b@example.com")).await.unwrap();

        let err = service
            .update(
                other.id,
                UserUpdate {
                    email: Some("a@example.com".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_applies_partial_fields() {
        let service = service();
        let user = service.create(new_user("a@example.com")).await.unwrap();

        let updated = service
            .update(
                user.id,
                UserUpdate {
                    first_name: Some("Renamed".to_string()),
                    status: Some(Status::Inactive),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Renamed");
        assert_eq!(updated.status, Status::Inactive);
        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.last_name, "User");
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let service = service();
        assert!(matches!(
            service.delete(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }
}
