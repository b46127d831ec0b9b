//! PostgreSQL implementation of RefreshTokenRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use chat_core::entities::RefreshToken;
use chat_core::error::DomainError;
use chat_core::traits::{RefreshTokenRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::RefreshTokenModel;

use super::error::{ensure_affected, map_db_error, map_unique_violation};
use super::session::PgSession;

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Debug, Clone)]
pub struct PgRefreshTokenRepository {
    session: Arc<PgSession>,
}

impl PgRefreshTokenRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip_all)]
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, user_id, token_hash, expires_at, created_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            ",
        )
        .bind(token_hash)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self, token), fields(token_id = %token.id, user_id = %token.user_id))]
    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(token.id.into_inner())
        .bind(token.user_id.into_inner())
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Internal("refresh token digest collision".to_string())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke(&self, id: Snowflake) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::RefreshTokenRevoked)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()
            ",
        )
        .bind(user_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
