//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.
//!
//! Lookups by id, email and confirmation token return soft-deleted rows too, so guards can tell "missing"
//! from "deleted". Listing and lookup-by-key methods only see live rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Chat, ChatMember, Mention, Message, RefreshToken, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID, including soft-deleted users
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by email, including soft-deleted users
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find the user holding a pending confirmation token, including soft-deleted users
    async fn find_by_confirmation_token(&self, token: &str) -> RepoResult<Option<User>>;

    /// Check whether any account (deleted or not) uses this email
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Persist profile and verification state
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Soft delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find chat by ID, including soft-deleted chats
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>>;

    /// Find the live one-to-one chat between two users, in either order
    async fn find_one_to_one(&self, first: Snowflake, second: Snowflake)
        -> RepoResult<Option<Chat>>;

    /// List live chats the user is a member of, newest first
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>>;

    async fn create(&self, chat: &Chat) -> RepoResult<()>;

    /// Persist name, description and visibility
    async fn update(&self, chat: &Chat) -> RepoResult<()>;

    /// Soft delete a chat
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<ChatMember>>;

    /// List members of a chat, oldest first
    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>>;

    async fn count(&self, chat_id: Snowflake) -> RepoResult<i64>;

    /// Add a member; a duplicate `(chat_id, user_id)` fails with `AlreadyMember`
    async fn create(&self, member: &ChatMember) -> RepoResult<()>;

    async fn delete(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination options for message queries
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    /// Only messages with an id lower than this
    pub before: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a live message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// List live messages in a chat, newest first
    async fn find_by_chat(&self, chat_id: Snowflake, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Update message content (edit)
    async fn update(&self, message: &Message) -> RepoResult<()>;

    /// Soft delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Mention Repository
// ============================================================================

#[async_trait]
pub trait MentionRepository: Send + Sync {
    /// Advisory uniqueness check over user and chat mentions alike
    async fn exists_by_shortname(&self, shortname: &str) -> RepoResult<bool>;

    async fn find_by_shortname(&self, shortname: &str) -> RepoResult<Option<Mention>>;

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Mention>>;

    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Mention>>;

    /// Insert a mention; a taken shortname fails with `ShortnameTaken`
    async fn create(&self, mention: &Mention) -> RepoResult<()>;

    /// Rename a mention; a taken shortname fails with `ShortnameTaken`
    async fn update_shortname(&self, id: Snowflake, shortname: &str) -> RepoResult<()>;

    /// Drop the mention of a chat, returning the number of rows removed
    async fn delete_by_chat(&self, chat_id: Snowflake) -> RepoResult<u64>;

    /// Drop mentions whose owning user or chat has been soft-deleted
    async fn delete_orphaned(&self) -> RepoResult<u64>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Find a token by the digest of its raw value, whatever its state
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>>;

    async fn create(&self, token: &RefreshToken) -> RepoResult<()>;

    /// Mark a token revoked
    async fn revoke(&self, id: Snowflake) -> RepoResult<()>;

    /// Revoke every active token of a user, returning how many were revoked
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64>;

    /// Delete tokens that expired before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}
