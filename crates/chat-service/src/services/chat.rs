//! Chat service
//!
//! One-to-one chat creation and chat lookups.

use chat_core::entities::{Chat, ChatMember, MemberRole, MentionTarget};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{ChatView, CreateChatRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guards;
use super::render;
use super::transaction::{begin, finish};

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a one-to-one chat between the caller and another user
    #[instrument(skip(self, request), fields(peer_id = %request.user_id))]
    pub async fn create_chat(&self, user_id: Snowflake, request: CreateChatRequest) -> ServiceResult<ChatView> {
        if request.user_id == user_id {
            return Err(ServiceError::field(
                "user_id",
                "self_chat",
                "Cannot create a chat with yourself",
            ));
        }

        let uow = begin(self.ctx).await?;
        let result = self.create_chat_in_tx(uow.as_ref(), user_id, request.user_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn create_chat_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        first: Snowflake,
        second: Snowflake,
    ) -> ServiceResult<ChatView> {
        guards::verified_user(uow, first).await?;
        let peer = guards::verified_user(uow, second).await?;

        if uow.chats().find_one_to_one(first, second).await?.is_some() {
            return Err(DomainError::ChatAlreadyExists.into());
        }

        let chat = Chat::one_to_one(self.ctx.generate_id());
        uow.chats().create(&chat).await?;
        for member in [first, second] {
            uow.members()
                .create(&ChatMember::new(chat.id, member, MemberRole::Member))
                .await?;
        }

        info!(chat_id = %chat.id, "One-to-one chat created");
        let peer = render::public_user(uow, &peer).await?;
        Ok(ChatView::one_to_one(&chat, peer))
    }

    /// Live chats of the caller, newest first
    #[instrument(skip(self))]
    pub async fn get_user_chats(&self, user_id: Snowflake) -> ServiceResult<Vec<ChatView>> {
        let uow = self.ctx.unit_of_work().await?;
        let chats = uow.chats().find_by_member(user_id).await?;

        let mut views = Vec::with_capacity(chats.len());
        for chat in &chats {
            views.push(render::chat(uow.as_ref(), user_id, chat).await?);
        }
        Ok(views)
    }

    /// One chat as seen by the caller; non-members may only see public groups
    #[instrument(skip(self))]
    pub async fn get_chat(&self, user_id: Snowflake, chat_id: Snowflake) -> ServiceResult<ChatView> {
        let uow = self.ctx.unit_of_work().await?;
        let chat = uow
            .chats()
            .find_by_id(chat_id)
            .await?
            .ok_or(DomainError::ChatNotFound(chat_id))?;

        if chat.is_deleted() {
            return Ok(ChatView::Deleted { id: chat.id });
        }
        if !chat.is_public_group() {
            guards::member(uow.as_ref(), chat.id, user_id).await?;
        }

        render::chat(uow.as_ref(), user_id, &chat).await
    }

    /// Resolve a public group by its shortname
    #[instrument(skip(self))]
    pub async fn find_public_group(&self, user_id: Snowflake, shortname: &str) -> ServiceResult<ChatView> {
        let not_found = || DomainError::ChatNotFound(Snowflake::default());

        let uow = self.ctx.unit_of_work().await?;
        let mention = uow
            .mentions()
            .find_by_shortname(shortname)
            .await?
            .ok_or_else(not_found)?;
        let MentionTarget::Chat(chat_id) = mention.target else {
            return Err(not_found().into());
        };

        let chat = uow
            .chats()
            .find_by_id(chat_id)
            .await?
            .filter(|c| !c.is_deleted() && c.is_public_group())
            .ok_or_else(not_found)?;

        render::chat(uow.as_ref(), user_id, &chat).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Harness;

    #[tokio::test]
    async fn test_create_chat_then_duplicate() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;
        let grace = h.seed_verified("grace").await;
        let service = ChatService::new(&h.ctx);

        let view = service
            .create_chat(ada.id, CreateChatRequest { user_id: grace.id })
            .await
            .unwrap();
        let ChatView::OneToOne { id, peer, .. } = view else {
            panic!("expected one-to-one view");
        };
        assert_eq!(peer.id, grace.id);
        assert_eq!(h.uow().members().count(id).await.unwrap(), 2);

        // Either direction counts as the same pair
        let err = service
            .create_chat(grace.id, CreateChatRequest { user_id: ada.id })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Chat has already been created");
    }

    #[tokio::test]
    async fn test_create_chat_with_self_is_rejected_early() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;

        let err = ChatService::new(&h.ctx)
            .create_chat(ada.id, CreateChatRequest { user_id: ada.id })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_actor_makes_no_downstream_calls() {
        let h = Harness::new();
        let grace = h.seed_verified("grace").await;

        let err = ChatService::new(&h.ctx)
            .create_chat(Snowflake::new(404), CreateChatRequest { user_id: grace.id })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            h.store.calls(),
            vec!["uow.begin", "users.find_by_id", "uow.rollback"]
        );
    }

    #[tokio::test]
    async fn test_create_chat_peer_guards() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;
        let pending = h.seed_confirmed("pending@example.com").await;
        let gone = h.seed_verified("gone").await;
        h.soft_delete_user(&gone).await;
        let service = ChatService::new(&h.ctx);

        let err = service
            .create_chat(ada.id, CreateChatRequest { user_id: pending.id })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User is not verified");

        let err = service
            .create_chat(ada.id, CreateChatRequest { user_id: gone.id })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User has been deleted");
        assert_eq!(h.store.call_count("chats.find_one_to_one"), 0);
    }

    #[tokio::test]
    async fn test_get_chat_visibility() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;
        let grace = h.seed_verified("grace").await;
        let private = h.seed_group(&ada, None).await;
        let public = h.seed_group(&ada, Some("rustaceans")).await;
        let service = ChatService::new(&h.ctx);

        let err = service.get_chat(grace.id, private.id).await.unwrap_err();
        assert_eq!(err.to_string(), "User is not a member of this chat");

        let view = service.get_chat(grace.id, public.id).await.unwrap();
        let ChatView::Group { role, shortname, .. } = view else {
            panic!("expected group view");
        };
        assert_eq!(role, None);
        assert_eq!(shortname.as_deref(), Some("rustaceans"));

        let found = service.find_public_group(grace.id, "rustaceans").await.unwrap();
        assert_eq!(found.id(), public.id);
        let err = service.find_public_group(grace.id, "grace").await.unwrap_err();
        assert_eq!(err.to_string(), "Chat not found");
    }

    #[tokio::test]
    async fn test_deleted_chat_view() {
        let h = Harness::new();
        let ada = h.seed_verified("ada_l").await;
        let group = h.seed_group(&ada, None).await;
        h.uow().chats().delete(group.id).await.unwrap();

        let service = ChatService::new(&h.ctx);
        let view = service.get_chat(ada.id, group.id).await.unwrap();
        assert_eq!(view, ChatView::Deleted { id: group.id });
        assert!(service.get_user_chats(ada.id).await.unwrap().is_empty());
    }
}
