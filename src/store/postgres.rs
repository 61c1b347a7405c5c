//! Postgres implementations of the store contracts.
//!
//! Every query runs inside a `db.query` tracing span. Raw sqlx error text
//! is logged here and wrapped into an opaque domain error before it
//! reaches callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{Instrument, error};
use uuid::Uuid;

use super::{AuthStore, UserStore};
use crate::error::{Error, Result};
use crate::model::{BlacklistEntry, Session, TokenRecord, User};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, role, status, created_at, updated_at";

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn internal(context: &str, err: &sqlx::Error) -> Error {
    error!("{context}: {err}");
    Error::Internal(context.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// [`UserStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        let query = r"
            INSERT INTO users
                (id, email, first_name, last_name, password_hash, role, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ";
        sqlx::query(query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.status)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::Duplicate("email already registered".to_string())
                } else {
                    internal("failed to insert user", &err)
                }
            })?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|err| internal("failed to fetch user by id", &err))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|err| internal("failed to fetch user by email", &err))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)";
        sqlx::query_scalar::<_, bool>(query)
            .bind(email)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|err| internal("failed to check email existence", &err))
    }

    async fn update(&self, user: &User) -> Result<()> {
        let query = r"
            UPDATE users
            SET email = $2,
                first_name = $3,
                last_name = $4,
                password_hash = $5,
                role = $6,
                status = $7,
                updated_at = $8
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.status)
            .bind(user.updated_at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::Duplicate("email already registered".to_string())
                } else {
                    internal("failed to update user", &err)
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let query = "DELETE FROM users WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|err| internal("failed to delete user", &err))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|err| internal("failed to list users", &err))
    }
}

/// [`AuthStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn save_token(&self, record: &TokenRecord) -> Result<()> {
        let query = r"
            INSERT INTO token_records
                (user_id, access_token_hash, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
        ";
        sqlx::query(query)
            .bind(record.user_id)
            .bind(&record.access_token_hash)
            .bind(&record.refresh_token_hash)
            .bind(record.expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|err| internal("failed to save token record", &err))?;
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        let query = r"
            INSERT INTO sessions
                (id, user_id, refresh_token_hash, user_agent, client_ip, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ";
        sqlx::query(query)
            .bind(session.id)
            .bind(session.user_id)
            .bind(&session.refresh_token_hash)
            .bind(&session.user_agent)
            .bind(&session.client_ip)
            .bind(session.expires_at)
            .bind(session.created_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|err| internal("failed to create session", &err))?;
        Ok(())
    }

    async fn get_session_by_refresh_token(
        &self,
        refresh_token_hash: &[u8],
    ) -> Result<Option<Session>> {
        let query = r"
            SELECT id, user_id, refresh_token_hash, user_agent, client_ip, expires_at, created_at
            FROM sessions
            WHERE refresh_token_hash = $1
        ";
        sqlx::query_as::<_, Session>(query)
            .bind(refresh_token_hash)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|err| internal("failed to lookup session", &err))
    }

    async fn update_session(
        &self,
        id: Uuid,
        previous_hash: &[u8],
        new_hash: &[u8],
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        // Conditioned on the previous digest so that of two concurrent
        // refreshes of the same session, exactly one can win.
        let query = r"
            UPDATE sessions
            SET refresh_token_hash = $3, expires_at = $4
            WHERE id = $1
              AND refresh_token_hash = $2
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(previous_hash)
            .bind(new_hash)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(|err| internal("failed to rotate session", &err))?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        let query = "DELETE FROM sessions WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|err| internal("failed to delete session", &err))?;
        Ok(())
    }

    async fn get_sessions_by_user_id(&self, user_id: Uuid) -> Result<Vec<Session>> {
        let query = r"
            SELECT id, user_id, refresh_token_hash, user_agent, client_ip, expires_at, created_at
            FROM sessions
            WHERE user_id = $1
        ";
        sqlx::query_as::<_, Session>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|err| internal("failed to list sessions for user", &err))
    }

    async fn add_to_blacklist(&self, entry: &BlacklistEntry) -> Result<()> {
        let query = r"
            INSERT INTO token_blacklist (token_hash, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token_hash) DO UPDATE SET expires_at = EXCLUDED.expires_at
        ";
        sqlx::query(query)
            .bind(&entry.token_hash)
            .bind(entry.expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(|err| internal("failed to blacklist token", &err))?;
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_hash: &[u8]) -> Result<bool> {
        let query = r"
            SELECT EXISTS(
                SELECT 1 FROM token_blacklist
                WHERE token_hash = $1
                  AND expires_at > NOW()
            )
        ";
        sqlx::query_scalar::<_, bool>(query)
            .bind(token_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .map_err(|err| internal("failed to check blacklist", &err))
    }

    async fn cleanup_expired_tokens(&self) -> Result<u64> {
        let query = "DELETE FROM token_records WHERE expires_at <= NOW()";
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|err| internal("failed to cleanup expired token records", &err))?;
        Ok(result.rows_affected())
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let query = "DELETE FROM sessions WHERE expires_at <= NOW()";
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .map_err(|err| internal("failed to cleanup expired sessions", &err))?;
        Ok(result.rows_affected())
    }
}
