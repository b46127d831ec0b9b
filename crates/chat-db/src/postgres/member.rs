//! PostgreSQL implementation of MemberRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use chat_core::entities::ChatMember;
use chat_core::error::DomainError;
use chat_core::traits::{MemberRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::ChatMemberModel;

use super::error::{ensure_affected, map_db_error, map_unique_violation};
use super::session::PgSession;

/// PostgreSQL implementation of MemberRepository
#[derive(Debug, Clone)]
pub struct PgMemberRepository {
    session: Arc<PgSession>,
}

impl PgMemberRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<ChatMember>> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, ChatMemberModel>(
            r"
            SELECT chat_id, user_id, role, nickname, joined_at
            FROM chat_members
            WHERE chat_id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

        result.map(ChatMember::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>> {
        let mut conn = self.session.acquire().await?;
        let results = sqlx::query_as::<_, ChatMemberModel>(
            r"
            SELECT chat_id, user_id, role, nickname, joined_at
            FROM chat_members
            WHERE chat_id = $1
            ORDER BY joined_at ASC, user_id ASC
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ChatMember::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, chat_id: Snowflake) -> RepoResult<i64> {
        let mut conn = self.session.acquire().await?;
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_members WHERE chat_id = $1")
            .bind(chat_id.into_inner())
            .fetch_one(&mut *conn)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, member), fields(chat_id = %member.chat_id, user_id = %member.user_id))]
    async fn create(&self, member: &ChatMember) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO chat_members (chat_id, user_id, role, nickname, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(member.chat_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(&member.nickname)
        .bind(member.joined_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND user_id = $2")
            .bind(chat_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::NotChatMember)
    }
}
