//! Reusable guards
//!
//! Each guard loads what it checks and fails with the first violated
//! precondition. Callers chain them in the fixed order actor, target,
//! target state, membership, uniqueness.

use chat_core::entities::{Chat, ChatMember, User};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, Snowflake};

use super::error::ServiceResult;

/// User exists, is verified and is not deleted
pub(crate) async fn verified_user(uow: &dyn UnitOfWork, user_id: Snowflake) -> ServiceResult<User> {
    let user = uow
        .users()
        .find_by_id(user_id)
        .await?
        .ok_or(DomainError::UserNotFound(user_id))?;

    if !user.is_verified {
        return Err(DomainError::UserNotVerified.into());
    }
    if user.is_deleted() {
        return Err(DomainError::UserDeleted.into());
    }
    Ok(user)
}

/// Chat exists and is not deleted
pub(crate) async fn live_chat(uow: &dyn UnitOfWork, chat_id: Snowflake) -> ServiceResult<Chat> {
    let chat = uow
        .chats()
        .find_by_id(chat_id)
        .await?
        .ok_or(DomainError::ChatNotFound(chat_id))?;

    if chat.is_deleted() {
        return Err(DomainError::ChatDeleted.into());
    }
    Ok(chat)
}

/// Chat exists, is not deleted and is a group
pub(crate) async fn live_group(uow: &dyn UnitOfWork, group_id: Snowflake) -> ServiceResult<Chat> {
    let chat = live_chat(uow, group_id).await?;
    if !chat.is_group() {
        return Err(DomainError::NotAGroup.into());
    }
    Ok(chat)
}

pub(crate) async fn member(
    uow: &dyn UnitOfWork,
    chat_id: Snowflake,
    user_id: Snowflake,
) -> ServiceResult<ChatMember> {
    Ok(uow
        .members()
        .find(chat_id, user_id)
        .await?
        .ok_or(DomainError::NotChatMember)?)
}

pub(crate) async fn creator(
    uow: &dyn UnitOfWork,
    chat_id: Snowflake,
    user_id: Snowflake,
) -> ServiceResult<()> {
    match uow.members().find(chat_id, user_id).await? {
        Some(member) if member.is_creator() => Ok(()),
        _ => Err(DomainError::NotGroupCreator.into()),
    }
}

/// Advisory check in front of the unique index on mentions
pub(crate) async fn shortname_available(uow: &dyn UnitOfWork, shortname: &str) -> ServiceResult<()> {
    if uow.mentions().exists_by_shortname(shortname).await? {
        return Err(DomainError::ShortnameTaken.into());
    }
    Ok(())
}
