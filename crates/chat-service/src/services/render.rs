//! Assemble views from entities, looking up shortnames, peers and roles

use chat_core::entities::{Chat, ChatType, User};
use chat_core::traits::UnitOfWork;
use chat_core::Snowflake;

use crate::dto::{ChatView, UserView};

use super::error::ServiceResult;

async fn user_shortname(uow: &dyn UnitOfWork, user: &User) -> ServiceResult<Option<String>> {
    if user.is_deleted() {
        return Ok(None);
    }
    let mention = uow.mentions().find_by_user(user.id).await?;
    Ok(mention.map(|m| m.shortname))
}

/// The caller's own account, email included
pub(crate) async fn own_user(uow: &dyn UnitOfWork, user: &User) -> ServiceResult<UserView> {
    let shortname = user_shortname(uow, user).await?;
    Ok(UserView::owner(user, shortname))
}

pub(crate) async fn public_user(uow: &dyn UnitOfWork, user: &User) -> ServiceResult<UserView> {
    let shortname = user_shortname(uow, user).await?;
    Ok(UserView::public(user, shortname))
}

/// Missing rows render like deleted ones
pub(crate) async fn user_by_id(uow: &dyn UnitOfWork, user_id: Snowflake) -> ServiceResult<UserView> {
    match uow.users().find_by_id(user_id).await? {
        Some(user) => public_user(uow, &user).await,
        None => Ok(UserView::deleted(user_id)),
    }
}

pub(crate) async fn chat(
    uow: &dyn UnitOfWork,
    viewer: Snowflake,
    chat: &Chat,
) -> ServiceResult<ChatView> {
    if chat.is_deleted() {
        return Ok(ChatView::Deleted { id: chat.id });
    }

    match chat.chat_type {
        ChatType::Personal => Ok(ChatView::personal(chat)),
        ChatType::OneToOne => {
            let members = uow.members().find_by_chat(chat.id).await?;
            let peer_id = members
                .iter()
                .map(|m| m.user_id)
                .find(|id| *id != viewer)
                .unwrap_or(viewer);
            let peer = user_by_id(uow, peer_id).await?;
            Ok(ChatView::one_to_one(chat, peer))
        }
        ChatType::Group => {
            let shortname = uow.mentions().find_by_chat(chat.id).await?.map(|m| m.shortname);
            let member_count = uow.members().count(chat.id).await?;
            let role = uow.members().find(chat.id, viewer).await?.map(|m| m.role);
            Ok(ChatView::group(chat, shortname, member_count, role))
        }
    }
}
