//! PostgreSQL implementation of MentionRepository
//!
//! The unique index on `mentions.shortname` is the final word on uniqueness;
//! a violation on insert or rename surfaces as `ShortnameTaken`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use chat_core::entities::Mention;
use chat_core::error::DomainError;
use chat_core::traits::{MentionRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::owner_columns;
use crate::models::MentionModel;

use super::error::{ensure_affected, map_db_error, map_unique_violation};
use super::session::PgSession;

/// PostgreSQL implementation of MentionRepository
#[derive(Debug, Clone)]
pub struct PgMentionRepository {
    session: Arc<PgSession>,
}

impl PgMentionRepository {
    pub fn new(session: Arc<PgSession>) -> Self {
        Self { session }
    }

    async fn find_where(&self, filter: &'static str, value: Option<i64>, text: Option<&str>)
        -> RepoResult<Option<Mention>>
    {
        let sql = format!(
            "SELECT id, shortname, user_id, chat_id, created_at FROM mentions WHERE {filter}"
        );
        let mut conn = self.session.acquire().await?;
        let query = sqlx::query_as::<_, MentionModel>(&sql);
        let query = match (value, text) {
            (Some(id), _) => query.bind(id),
            (None, text) => query.bind(text),
        };
        let result = query
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)?;

        result.map(Mention::try_from).transpose()
    }
}

#[async_trait]
impl MentionRepository for PgMentionRepository {
    #[instrument(skip(self))]
    async fn exists_by_shortname(&self, shortname: &str) -> RepoResult<bool> {
        let mut conn = self.session.acquire().await?;
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM mentions WHERE shortname = $1)")
            .bind(shortname)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_by_shortname(&self, shortname: &str) -> RepoResult<Option<Mention>> {
        self.find_where("shortname = $1", None, Some(shortname)).await
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Mention>> {
        self.find_where("user_id = $1", Some(user_id.into_inner()), None)
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Mention>> {
        self.find_where("chat_id = $1", Some(chat_id.into_inner()), None)
            .await
    }

    #[instrument(skip(self, mention), fields(shortname = %mention.shortname))]
    async fn create(&self, mention: &Mention) -> RepoResult<()> {
        let (user_id, chat_id) = owner_columns(mention.target);
        let mut conn = self.session.acquire().await?;
        sqlx::query(
            r"
            INSERT INTO mentions (id, shortname, user_id, chat_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(mention.id.into_inner())
        .bind(&mention.shortname)
        .bind(user_id)
        .bind(chat_id)
        .bind(mention.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ShortnameTaken))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_shortname(&self, id: Snowflake, shortname: &str) -> RepoResult<()> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query("UPDATE mentions SET shortname = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(shortname)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::ShortnameTaken))?;

        ensure_affected(result.rows_affected(), || {
            DomainError::Database(format!("mention {id} vanished during update"))
        })
    }

    #[instrument(skip(self))]
    async fn delete_by_chat(&self, chat_id: Snowflake) -> RepoResult<u64> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query("DELETE FROM mentions WHERE chat_id = $1")
            .bind(chat_id.into_inner())
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_orphaned(&self) -> RepoResult<u64> {
        let mut conn = self.session.acquire().await?;
        let result = sqlx::query(
            r"
            DELETE FROM mentions m
            WHERE EXISTS (SELECT 1 FROM users u WHERE u.id = m.user_id AND u.deleted_at IS NOT NULL)
               OR EXISTS (SELECT 1 FROM chats c WHERE c.id = m.chat_id AND c.deleted_at IS NOT NULL)
            ",
        )
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
