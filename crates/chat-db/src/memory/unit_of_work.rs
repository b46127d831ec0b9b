//! In-memory unit of work

use std::sync::Arc;

use async_trait::async_trait;

use chat_core::traits::{
    ChatRepository, MemberRepository, MentionRepository, MessageRepository,
    RefreshTokenRepository, RepoResult, UnitOfWork, UnitOfWorkFactory, UserRepository,
};

use super::repositories::{
    MemoryChatRepository, MemoryMemberRepository, MemoryMentionRepository,
    MemoryMessageRepository, MemoryRefreshTokenRepository, MemoryUserRepository,
};
use super::session::MemorySession;
use super::MemoryStore;

pub struct MemoryUnitOfWork {
    session: Arc<MemorySession>,
    users: MemoryUserRepository,
    chats: MemoryChatRepository,
    members: MemoryMemberRepository,
    messages: MemoryMessageRepository,
    mentions: MemoryMentionRepository,
    refresh_tokens: MemoryRefreshTokenRepository,
}

impl MemoryUnitOfWork {
    pub fn new(store: MemoryStore) -> Self {
        let session = Arc::new(MemorySession::new(store));
        Self {
            users: MemoryUserRepository::new(Arc::clone(&session)),
            chats: MemoryChatRepository::new(Arc::clone(&session)),
            members: MemoryMemberRepository::new(Arc::clone(&session)),
            messages: MemoryMessageRepository::new(Arc::clone(&session)),
            mentions: MemoryMentionRepository::new(Arc::clone(&session)),
            refresh_tokens: MemoryRefreshTokenRepository::new(Arc::clone(&session)),
            session,
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
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

#[derive(Debug, Clone, Default)]
pub struct MemoryUnitOfWorkFactory {
    store: MemoryStore,
}

impl MemoryUnitOfWorkFactory {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    async fn create(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork::new(self.store.clone())))
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}
