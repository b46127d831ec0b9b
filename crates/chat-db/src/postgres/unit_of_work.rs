//! PostgreSQL unit of work

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::traits::{
    ChatRepository, MemberRepository, MentionRepository, MessageRepository,
    RefreshTokenRepository, RepoResult, UnitOfWork, UnitOfWorkFactory, UserRepository,
};

use super::error::map_db_error;
use super::{
    PgChatRepository, PgMemberRepository, PgMentionRepository, PgMessageRepository,
    PgRefreshTokenRepository, PgSession, PgUserRepository,
};

/// Repositories bound to one [`PgSession`]
///
/// Dropping a unit of work with an open transaction rolls it back.
#[derive(Debug)]
pub struct PgUnitOfWork {
    session: Arc<PgSession>,
    users: PgUserRepository,
    chats: PgChatRepository,
    members: PgMemberRepository,
    messages: PgMessageRepository,
    mentions: PgMentionRepository,
    refresh_tokens: PgRefreshTokenRepository,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        let session = Arc::new(PgSession::new(pool));
        Self {
            users: PgUserRepository::new(Arc::clone(&session)),
            chats: PgChatRepository::new(Arc::clone(&session)),
            members: PgMemberRepository::new(Arc::clone(&session)),
            messages: PgMessageRepository::new(Arc::clone(&session)),
            mentions: PgMentionRepository::new(Arc::clone(&session)),
            refresh_tokens: PgRefreshTokenRepository::new(Arc::clone(&session)),
            session,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn chats(&self) -> &dyn ChatRepository {
        &self.chats
    }

    fn members(&self) -> &dyn MemberRepository {
        &self.members
    }

    fn messages(&self) -> &dyn MessageRepository {
        &self.messages
    }

    fn mentions(&self) -> &dyn MentionRepository {
        &self.mentions
    }

    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.refresh_tokens
    }

    async fn begin_transaction(&self) -> RepoResult<()> {
        self.session.begin().await
    }

    async fn commit_transaction(&self) -> RepoResult<()> {
        self.session.commit().await
    }

    async fn rollback_transaction(&self) -> RepoResult<()> {
        self.session.rollback().await
    }
}

/// Hands out a fresh [`PgUnitOfWork`] per request
#[derive(Debug, Clone)]
pub struct PgUnitOfWorkFactory {
    pool: PgPool,
}

impl PgUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    async fn create(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(PgUnitOfWork::new(self.pool.clone())))
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
