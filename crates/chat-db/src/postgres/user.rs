//! PostgreSQL implementation of UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use chat_core::entities::User;
use chat_core::error::DomainError;
use chat_core::traits::{RepoResult, UserRepository};
use chat_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{ensure_affected, map_db_error, map_unique_violation};
use super::session::PgSession;

const USER_COLUMNS: &str = "u.id, u.email, u.display_name, u.is_verified, u.email_confirmed, \
                            u.confirmation_token, u.created_at, u.updated_at, u.deleted_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    session: Arc<PgSession>,
}

impl PgUserRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }

    async fn find_one(&self, filter: &str, value: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE {filter}");
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("u.email = $1", email).await
    }

    #[instrument(skip(self, token))]
    async fn find_by_confirmation_token(&self, token: &str) -> RepoResult<Option<User>> {
        self.find_one("u.confirmation_token = $1", token).await
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let mut conn = self.session.acquire().await?;
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, display_name, is_verified,
                               email_confirmed, confirmation_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.display_name)
        .bind(user.is_verified)
        .bind(user.email_confirmed)
        .bind(&user.confirmation_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(
            r"
            UPDATE users
            SET display_name = $2, is_verified = $3, email_confirmed = $4,
                confirmation_token = $5, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.display_name)
        .bind(user.is_verified)
        .bind(user.email_confirmed)
        .bind(&user.confirmation_token)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::UserNotFound(user.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(concat!(
            "UPDATE users u SET deleted_at = NOW() WHERE u.id = $1 AND ",
            live!("u")
        ))
        .bind(id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::UserNotFound(id))
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        let mut conn = self.session.acquire().await?;
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)
    }
}
