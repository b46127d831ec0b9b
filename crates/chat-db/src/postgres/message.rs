//! PostgreSQL implementation of MessageRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use chat_core::entities::Message;
use chat_core::error::DomainError;
use chat_core::traits::{MessageQuery, MessageRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::error::{ensure_affected, map_db_error};
use super::session::PgSession;

/// PostgreSQL implementation of MessageRepository
#[derive(Debug, Clone)]
pub struct PgMessageRepository {
    session: Arc<PgSession>,
}

impl PgMessageRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query_as::<_, MessageModel>(concat!(
            r"
            SELECT m.id, m.chat_id, m.author_id, m.content, m.created_at, m.edited_at, m.deleted_at
            FROM messages m
            WHERE m.id = $1 AND ",
            live!("m")
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100);
        // i64::MAX as cursor means "from the newest message"
        let before = query.before.map_or(i64::MAX, Snowflake::into_inner);

        let mut conn = self.session.acquire().await?;
        let results = sqlx::query_as::<_, MessageModel>(concat!(
            r"
            SELECT m.id, m.chat_id, m.author_id, m.content, m.created_at, m.edited_at, m.deleted_at
            FROM messages m
            WHERE m.chat_id = $1 AND m.id < $2 AND ",
            live!("m"),
            r"
            ORDER BY m.id DESC
            LIMIT $3
            "
        ))
        .bind(chat_id.into_inner())
        .bind(before)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO messages (id, chat_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.chat_id.into_inner())
        .bind(message.author_id.into_inner())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn update(&self, message: &Message) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(concat!(
            r"
            UPDATE messages m
            SET content = $2, edited_at = $3
            WHERE m.id = $1 AND ",
            live!("m")
        ))
        .bind(message.id.into_inner())
        .bind(&message.content)
        .bind(message.edited_at)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::MessageNotFound(message.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(concat!(
            "UPDATE messages m SET deleted_at = NOW() WHERE m.id = $1 AND ",
            live!("m")
        ))
        .bind(id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        ensure_affected(result.rows_affected(), || DomainError::MessageNotFound(id))
    }
}
