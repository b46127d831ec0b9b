//! Group service
//!
//! Group lifecycle: creation, deletion, visibility changes and membership.

use chat_core::entities::{Chat, ChatMember, MemberRole, Mention};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{ChatView, CreateGroupRequest, MakePublicGroupRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guards;
use super::render;
use super::transaction::{begin, finish};

/// Group service
pub struct GroupService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GroupService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a group with the caller as its creator
    #[instrument(skip(self, request), fields(name = %request.name, is_private = request.is_private))]
    pub async fn create_group(&self, user_id: Snowflake, request: CreateGroupRequest) -> ServiceResult<ChatView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.create_group_in_tx(uow.as_ref(), user_id, request).await;
        finish(uow.as_ref(), result).await
    }

    async fn create_group_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        request: CreateGroupRequest,
    ) -> ServiceResult<ChatView> {
        guards::verified_user(uow, user_id).await?;

        // Private groups never hold a shortname
        let shortname = if request.is_private { None } else { request.shortname };
        if let Some(shortname) = &shortname {
            guards::shortname_available(uow, shortname).await?;
        }

        let chat = Chat::group(
            self.ctx.generate_id(),
            request.name,
            request.description,
            request.is_private,
        );
        uow.chats().create(&chat).await?;
        uow.members()
            .create(&ChatMember::new(chat.id, user_id, MemberRole::Creator))
            .await?;
        if let Some(shortname) = &shortname {
            let mention = Mention::for_chat(self.ctx.generate_id(), chat.id, shortname.clone());
            uow.mentions().create(&mention).await?;
        }

        info!(chat_id = %chat.id, "Group created");
        Ok(ChatView::group(&chat, shortname, 1, Some(MemberRole::Creator)))
    }

    /// Soft-delete a group and release its shortname
    #[instrument(skip(self))]
    pub async fn delete_group(&self, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<()> {
        let uow = begin(self.ctx).await?;
        let result = Self::delete_group_in_tx(uow.as_ref(), user_id, group_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn delete_group_in_tx(uow: &dyn UnitOfWork, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<()> {
        guards::verified_user(uow, user_id).await?;
        guards::live_group(uow, group_id).await?;
        guards::creator(uow, group_id, user_id).await?;

        uow.mentions().delete_by_chat(group_id).await?;
        uow.chats().delete(group_id).await?;

        info!(%group_id, "Group deleted");
        Ok(())
    }

    /// Publish a private group under a shortname
    #[instrument(skip(self, request), fields(shortname = %request.shortname))]
    pub async fn make_public(
        &self,
        user_id: Snowflake,
        group_id: Snowflake,
        request: MakePublicGroupRequest,
    ) -> ServiceResult<ChatView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self
            .make_public_in_tx(uow.as_ref(), user_id, group_id, request.shortname)
            .await;
        finish(uow.as_ref(), result).await
    }

    async fn make_public_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        group_id: Snowflake,
        shortname: String,
    ) -> ServiceResult<ChatView> {
        guards::verified_user(uow, user_id).await?;
        let mut chat = guards::live_group(uow, group_id).await?;
        if !chat.is_private {
            return Err(DomainError::GroupIsPublic.into());
        }
        guards::creator(uow, group_id, user_id).await?;
        guards::shortname_available(uow, &shortname).await?;

        let mention = Mention::for_chat(self.ctx.generate_id(), group_id, shortname);
        uow.mentions().create(&mention).await?;
        chat.set_private(false);
        uow.chats().update(&chat).await?;

        info!(%group_id, shortname = %mention.shortname, "Group made public");
        render::chat(uow, user_id, &chat).await
    }

    /// Hide a public group and release its shortname
    #[instrument(skip(self))]
    pub async fn make_private(&self, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<ChatView> {
        let uow = begin(self.ctx).await?;
        let result = Self::make_private_in_tx(uow.as_ref(), user_id, group_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn make_private_in_tx(
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        group_id: Snowflake,
    ) -> ServiceResult<ChatView> {
        guards::verified_user(uow, user_id).await?;
        let mut chat = guards::live_group(uow, group_id).await?;
        if chat.is_private {
            return Err(DomainError::GroupIsPrivate.into());
        }
        guards::creator(uow, group_id, user_id).await?;

        uow.mentions().delete_by_chat(group_id).await?;
        chat.set_private(true);
        uow.chats().update(&chat).await?;

        info!(%group_id, "Group made private");
        render::chat(uow, user_id, &chat).await
    }

    /// Join a public group as a regular member
    #[instrument(skip(self))]
    pub async fn join(&self, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<ChatView> {
        let uow = begin(self.ctx).await?;
        let result = Self::join_in_tx(uow.as_ref(), user_id, group_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn join_in_tx(uow: &dyn UnitOfWork, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<ChatView> {
        guards::verified_user(uow, user_id).await?;
        let chat = guards::live_group(uow, group_id).await?;
        if chat.is_private {
            return Err(DomainError::GroupIsPrivate.into());
        }
        if uow.members().find(group_id, user_id).await?.is_some() {
            return Err(DomainError::AlreadyMember.into());
        }

        uow.members()
            .create(&ChatMember::new(group_id, user_id, MemberRole::Member))
            .await?;

        info!(%group_id, "Joined group");
        render::chat(uow, user_id, &chat).await
    }

    /// Leave a group; the creator has to delete it instead
    #[instrument(skip(self))]
    pub async fn leave(&self, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<()> {
        let uow = begin(self.ctx).await?;
        let result = Self::leave_in_tx(uow.as_ref(), user_id, group_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn leave_in_tx(uow: &dyn UnitOfWork, user_id: Snowflake, group_id: Snowflake) -> ServiceResult<()> {
        guards::verified_user(uow, user_id).await?;
        guards::live_group(uow, group_id).await?;
        let member = guards::member(uow, group_id, user_id).await?;
        if member.is_creator() {
            return Err(DomainError::CreatorCannotLeave.into());
        }

        uow.members().delete(group_id, user_id).await?;

        info!(%group_id, "Left group");
        Ok(())
    }
}
