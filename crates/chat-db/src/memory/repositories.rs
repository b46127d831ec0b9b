//! Repository implementations over [`MemoryStore`](super::MemoryStore)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use chat_core::entities::{Chat, ChatMember, ChatType, Mention, Message, RefreshToken, User};
use chat_core::traits::{
    ChatRepository, MemberRepository, MentionRepository, MessageQuery, MessageRepository,
    RefreshTokenRepository, RepoResult, UserRepository,
};
use chat_core::{DomainError, RefreshTokenState, Snowflake};

use super::session::MemorySession;
use super::UserRow;

// ============================================================================
// Users
// ============================================================================

#[derive(Clone)]
pub struct MemoryUserRepository {
    session: Arc<MemorySession>,
}

impl MemoryUserRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.session
            .run("users.find_by_id", move |state| {
                Ok(state.users.get(&id).map(|row| row.user.clone()))
            })
            .await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.session
            .run("users.find_by_email", move |state| {
                Ok(state
                    .users
                    .values()
                    .find(|row| row.user.email == email)
                    .map(|row| row.user.clone()))
            })
            .await
    }

    async fn find_by_confirmation_token(&self, token: &str) -> RepoResult<Option<User>> {
        self.session
            .run("users.find_by_confirmation_token", move |state| {
                Ok(state
                    .users
                    .values()
                    .find(|row| row.user.confirmation_token.as_deref() == Some(token))
                    .map(|row| row.user.clone()))
            })
            .await
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        self.session
            .run("users.email_exists", move |state| {
                Ok(state.users.values().any(|row| row.user.email == email))
            })
            .await
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let row = UserRow {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        };
        self.session
            .run("users.create", move |state| {
                let taken = state.users.contains_key(&row.user.id)
                    || state.users.values().any(|other| other.user.email == row.user.email);
                if taken {
                    return Err(DomainError::EmailAlreadyExists);
                }
                state.users.insert(row.user.id, row);
                Ok(())
            })
            .await
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let user = user.clone();
        self.session
            .run("users.update", move |state| {
                let row = state
                    .users
                    .get_mut(&user.id)
                    .ok_or(DomainError::UserNotFound(user.id))?;
                row.user.display_name = user.display_name;
                row.user.is_verified = user.is_verified;
                row.user.email_confirmed = user.email_confirmed;
                row.user.confirmation_token = user.confirmation_token;
                row.user.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.session
            .run("users.delete", move |state| {
                match state.users.get_mut(&id) {
                    Some(row) if !row.user.is_deleted() => {
                        row.user.deleted_at = Some(Utc::now());
                        Ok(())
                    }
                    _ => Err(DomainError::UserNotFound(id)),
                }
            })
            .await
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        self.session
            .run("users.get_password_hash", move |state| {
                Ok(state.users.get(&id).map(|row| row.password_hash.clone()))
            })
            .await
    }
}

// ============================================================================
// Chats
// ============================================================================

#[derive(Clone)]
pub struct MemoryChatRepository {
    session: Arc<MemorySession>,
}

impl MemoryChatRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ChatRepository for MemoryChatRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        self.session
            .run("chats.find_by_id", move |state| Ok(state.chats.get(&id).cloned()))
            .await
    }

    async fn find_one_to_one(
        &self,
        first: Snowflake,
        second: Snowflake,
    ) -> RepoResult<Option<Chat>> {
        self.session
            .run("chats.find_one_to_one", move |state| {
                Ok(state
                    .chats
                    .values()
                    .filter(|chat| chat.chat_type == ChatType::OneToOne && !chat.is_deleted())
                    .find(|chat| {
                        state.members.contains_key(&(chat.id, first))
                            && state.members.contains_key(&(chat.id, second))
                    })
                    .cloned())
            })
            .await
    }

    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        self.session
            .run("chats.find_by_member", move |state| {
                Ok(state
                    .chats
                    .values()
                    .rev()
                    .filter(|chat| !chat.is_deleted())
                    .filter(|chat| state.members.contains_key(&(chat.id, user_id)))
                    .cloned()
                    .collect())
            })
            .await
    }

    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        let chat = chat.clone();
        self.session
            .run("chats.create", move |state| {
                if state.chats.contains_key(&chat.id) {
                    return Err(DomainError::Database(format!("duplicate chat id {}", chat.id)));
                }
                state.chats.insert(chat.id, chat);
                Ok(())
            })
            .await
    }

    async fn update(&self, chat: &Chat) -> RepoResult<()> {
        let chat = chat.clone();
        self.session
            .run("chats.update", move |state| {
                match state.chats.get_mut(&chat.id) {
                    Some(stored) if !stored.is_deleted() => {
                        stored.name = chat.name;
                        stored.description = chat.description;
                        stored.is_private = chat.is_private;
                        stored.updated_at = Utc::now();
                        Ok(())
                    }
                    _ => Err(DomainError::ChatNotFound(chat.id)),
                }
            })
            .await
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.session
            .run("chats.delete", move |state| match state.chats.get_mut(&id) {
                Some(chat) if !chat.is_deleted() => {
                    let now = Utc::now();
                    chat.deleted_at = Some(now);
                    chat.updated_at = now;
                    Ok(())
                }
                _ => Err(DomainError::ChatNotFound(id)),
            })
            .await
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Clone)]
pub struct MemoryMemberRepository {
    session: Arc<MemorySession>,
}

impl MemoryMemberRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn find(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<ChatMember>> {
        self.session
            .run("members.find", move |state| {
                Ok(state.members.get(&(chat_id, user_id)).cloned())
            })
            .await
    }

    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>> {
        self.session
            .run("members.find_by_chat", move |state| {
                let mut members: Vec<ChatMember> = state
                    .members
                    .values()
                    .filter(|member| member.chat_id == chat_id)
                    .cloned()
                    .collect();
                members.sort_by_key(|member| (member.joined_at, member.user_id));
                Ok(members)
            })
            .await
    }

    async fn count(&self, chat_id: Snowflake) -> RepoResult<i64> {
        self.session
            .run("members.count", move |state| {
                Ok(state
                    .members
                    .keys()
                    .filter(|(chat, _)| *chat == chat_id)
                    .count() as i64)
            })
            .await
    }

    async fn create(&self, member: &ChatMember) -> RepoResult<()> {
        let member = member.clone();
        self.session
            .run("members.create", move |state| {
                let key = (member.chat_id, member.user_id);
                if state.members.contains_key(&key) {
                    return Err(DomainError::AlreadyMember);
                }
                state.members.insert(key, member);
                Ok(())
            })
            .await
    }

    async fn delete(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.session
            .run("members.delete", move |state| {
                state
                    .members
                    .remove(&(chat_id, user_id))
                    .map(|_| ())
                    .ok_or(DomainError::NotChatMember)
            })
            .await
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone)]
pub struct MemoryMessageRepository {
    session: Arc<MemorySession>,
}

impl MemoryMessageRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        self.session
            .run("messages.find_by_id", move |state| {
                Ok(state
                    .messages
                    .get(&id)
                    .filter(|message| !message.is_deleted())
                    .cloned())
            })
            .await
    }

    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100) as usize;
        self.session
            .run("messages.find_by_chat", move |state| {
                Ok(state
                    .messages
                    .values()
                    .rev()
                    .filter(|message| message.chat_id == chat_id && !message.is_deleted())
                    .filter(|message| query.before.map_or(true, |before| message.id < before))
                    .take(limit)
                    .cloned()
                    .collect())
            })
            .await
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        let message = message.clone();
        self.session
            .run("messages.create", move |state| {
                state.messages.insert(message.id, message);
                Ok(())
            })
            .await
    }

    async fn update(&self, message: &Message) -> RepoResult<()> {
        let message = message.clone();
        self.session
            .run("messages.update", move |state| {
                match state.messages.get_mut(&message.id) {
                    Some(stored) if !stored.is_deleted() => {
                        stored.content = message.content;
                        stored.edited_at = message.edited_at;
                        Ok(())
                    }
                    _ => Err(DomainError::MessageNotFound(message.id)),
                }
            })
            .await
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.session
            .run("messages.delete", move |state| match state.messages.get_mut(&id) {
                Some(message) if !message.is_deleted() => {
                    message.deleted_at = Some(Utc::now());
                    Ok(())
                }
                _ => Err(DomainError::MessageNotFound(id)),
            })
            .await
    }
}

// ============================================================================
// Mentions
// ============================================================================

#[derive(Clone)]
pub struct MemoryMentionRepository {
    session: Arc<MemorySession>,
}

impl MemoryMentionRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl MentionRepository for MemoryMentionRepository {
    async fn exists_by_shortname(&self, shortname: &str) -> RepoResult<bool> {
        self.session
            .run("mentions.exists_by_shortname", move |state| {
                Ok(state.mentions.values().any(|m| m.shortname == shortname))
            })
            .await
    }

    async fn find_by_shortname(&self, shortname: &str) -> RepoResult<Option<Mention>> {
        self.session
            .run("mentions.find_by_shortname", move |state| {
                Ok(state
                    .mentions
                    .values()
                    .find(|m| m.shortname == shortname)
                    .cloned())
            })
            .await
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Mention>> {
        self.session
            .run("mentions.find_by_user", move |state| {
                Ok(state
                    .mentions
                    .values()
                    .find(|m| m.user_id() == Some(user_id))
                    .cloned())
            })
            .await
    }

    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Mention>> {
        self.session
            .run("mentions.find_by_chat", move |state| {
                Ok(state
                    .mentions
                    .values()
                    .find(|m| m.chat_id() == Some(chat_id))
                    .cloned())
            })
            .await
    }

    async fn create(&self, mention: &Mention) -> RepoResult<()> {
        let mention = mention.clone();
        self.session
            .run("mentions.create", move |state| {
                // Same constraints as the unique indexes on shortname and owner
                let clash = state
                    .mentions
                    .values()
                    .any(|m| m.shortname == mention.shortname || m.target == mention.target);
                if clash {
                    return Err(DomainError::ShortnameTaken);
                }
                state.mentions.insert(mention.id, mention);
                Ok(())
            })
            .await
    }

    async fn update_shortname(&self, id: Snowflake, shortname: &str) -> RepoResult<()> {
        self.session
            .run("mentions.update_shortname", move |state| {
                if state
                    .mentions
                    .values()
                    .any(|m| m.id != id && m.shortname == shortname)
                {
                    return Err(DomainError::ShortnameTaken);
                }
                let mention = state.mentions.get_mut(&id).ok_or_else(|| {
                    DomainError::Database(format!("mention {id} vanished during update"))
                })?;
                mention.shortname = shortname.to_string();
                Ok(())
            })
            .await
    }

    async fn delete_by_chat(&self, chat_id: Snowflake) -> RepoResult<u64> {
        self.session
            .run("mentions.delete_by_chat", move |state| {
                let before = state.mentions.len();
                state.mentions.retain(|_, m| m.chat_id() != Some(chat_id));
                Ok((before - state.mentions.len()) as u64)
            })
            .await
    }

    async fn delete_orphaned(&self) -> RepoResult<u64> {
        self.session
            .run("mentions.delete_orphaned", |state| {
                let deleted_users: Vec<Snowflake> = state
                    .users
                    .values()
                    .filter(|row| row.user.is_deleted())
                    .map(|row| row.user.id)
                    .collect();
                let deleted_chats: Vec<Snowflake> = state
                    .chats
                    .values()
                    .filter(|chat| chat.is_deleted())
                    .map(|chat| chat.id)
                    .collect();

                let before = state.mentions.len();
                state.mentions.retain(|_, m| {
                    !m.user_id().is_some_and(|id| deleted_users.contains(&id))
                        && !m.chat_id().is_some_and(|id| deleted_chats.contains(&id))
                });
                Ok((before - state.mentions.len()) as u64)
            })
            .await
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[derive(Clone)]
pub struct MemoryRefreshTokenRepository {
    session: Arc<MemorySession>,
}

impl MemoryRefreshTokenRepository {
    pub(crate) fn new(session: Arc<MemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        self.session
            .run("refresh_tokens.find_by_hash", move |state| {
                Ok(state
                    .refresh_tokens
                    .values()
                    .find(|t| t.token_hash == token_hash)
                    .cloned())
            })
            .await
    }

    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        let token = token.clone();
        self.session
            .run("refresh_tokens.create", move |state| {
                if state
                    .refresh_tokens
                    .values()
                    .any(|t| t.token_hash == token.token_hash)
                {
                    return Err(DomainError::Internal(
                        "refresh token digest collision".to_string(),
                    ));
                }
                state.refresh_tokens.insert(token.id, token);
                Ok(())
            })
            .await
    }

    async fn revoke(&self, id: Snowflake) -> RepoResult<()> {
        self.session
            .run("refresh_tokens.revoke", move |state| {
                match state.refresh_tokens.get_mut(&id) {
                    Some(token) if token.revoked_at.is_none() => {
                        token.revoked_at = Some(Utc::now());
                        Ok(())
                    }
                    _ => Err(DomainError::RefreshTokenRevoked),
                }
            })
            .await
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        self.session
            .run("refresh_tokens.revoke_all_for_user", move |state| {
                let now = Utc::now();
                let mut revoked = 0;
                for token in state.refresh_tokens.values_mut() {
                    if token.user_id == user_id && token.state_at(now) == RefreshTokenState::Active {
                        token.revoked_at = Some(now);
                        revoked += 1;
                    }
                }
                Ok(revoked)
            })
            .await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        self.session
            .run("refresh_tokens.delete_expired", move |state| {
                let before = state.refresh_tokens.len();
                state.refresh_tokens.retain(|_, t| t.expires_at >= now);
                Ok((before - state.refresh_tokens.len()) as u64)
            })
            .await
    }
}
