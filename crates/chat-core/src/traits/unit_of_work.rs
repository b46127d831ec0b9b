//! Unit of work - the transaction boundary shared by all repositories
//!
//! A unit of work is created per request. Repositories obtained from it run
//! inside the transaction while one is open, and on autocommit otherwise.

use async_trait::async_trait;

use super::repositories::{
    ChatRepository, MemberRepository, MentionRepository, MessageRepository,
    RefreshTokenRepository, RepoResult, UserRepository,
};

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> &dyn UserRepository;

    fn chats(&self) -> &dyn ChatRepository;

    fn members(&self) -> &dyn MemberRepository;

    fn messages(&self) -> &dyn MessageRepository;

    fn mentions(&self) -> &dyn MentionRepository;

    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository;

    /// Open a transaction. Fails if one is already open.
    async fn begin_transaction(&self) -> RepoResult<()>;

    /// Commit the open transaction
    async fn commit_transaction(&self) -> RepoResult<()>;

    /// Roll back the open transaction; a no-op when none is open
    async fn rollback_transaction(&self) -> RepoResult<()>;
}

/// Creates request-scoped units of work
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn create(&self) -> RepoResult<Box<dyn UnitOfWork>>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> RepoResult<()>;
}
