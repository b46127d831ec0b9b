//! PostgreSQL implementation of ChatRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use chat_core::entities::Chat;
use chat_core::error::DomainError;
use chat_core::traits::{ChatRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::ChatModel;

use super::error::{ensure_affected, map_db_error};
use super::session::PgSession;

/// PostgreSQL implementation of ChatRepository
#[derive(Debug, Clone)]
pub struct PgChatRepository {
    session: Arc<PgSession>,
}

impl PgChatRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, chat_type, name, description, is_private, created_at, updated_at, deleted_at
            FROM chats
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_one_to_one(
        &self,
        first: Snowflake,
        second: Snowflake,
    ) -> RepoResult<Option<Chat>> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, ChatModel>(concat!(
            r"
            SELECT c.id, c.chat_type, c.name, c.description, c.is_private,
                   c.created_at, c.updated_at, c.deleted_at
            FROM chats c
            JOIN chat_members a ON a.chat_id = c.id AND a.user_id = $1
            JOIN chat_members b ON b.chat_id = c.id AND b.user_id = $2
            WHERE c.chat_type = 'one_to_one' AND ",
            live!("c"),
            r"
            LIMIT 1
            "
        ))
        .bind(first.into_inner())
        .bind(second.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        let mut conn = self.session.acquire().await?;
        let results = sqlx::query_as::<_, ChatModel>(concat!(
            r"
            SELECT c.id, c.chat_type, c.name, c.description, c.is_private,
                   c.created_at, c.updated_at, c.deleted_at
            FROM chats c
            JOIN chat_members m ON m.chat_id = c.id
            WHERE m.user_id = $1 AND ",
            live!("c"),
            r"
            ORDER BY c.id DESC
            "
        ))
        .bind(user_id.into_inner())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Chat::try_from).collect()
    }

    #[instrument(skip(self, chat), fields(chat_id = %chat.id))]
    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO chats (id, chat_type, name, description, is_private, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(chat.id.into_inner())
        .bind(chat.chat_type.as_str())
        .bind(&chat.name)
        .bind(&chat.description)
        .bind(chat.is_private)
        .bind(chat.created_at)
        .bind(chat.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, chat), fields(chat_id = %chat.id))]
    async fn update(&self, chat: &Chat) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(concat!(
            r"
            UPDATE chats c
            SET name = $2, description = $3, is_private = $4, updated_at = NOW()
            WHERE c.id = $1 AND ",
            live!("c")
        ))
        .bind(chat.id.into_inner())
        .bind(&chat.name)
        .bind(&chat.description)
        .bind(chat.is_private)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::ChatNotFound(chat.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(concat!(
            "UPDATE chats c SET deleted_at = NOW(), updated_at = NOW() WHERE c.id = $1 AND ",
            live!("c")
        ))
        .bind(id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::ChatNotFound(id))
    }
}
