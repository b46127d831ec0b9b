//! Message service
//!
//! Handles sending, editing, deleting and paging messages.

use std::collections::HashMap;

use chat_core::entities::{Chat, Message};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, MessageQuery, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{EditMessageRequest, MessagePage, MessageView, SendMessageRequest, UserView};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guards;
use super::render;
use super::transaction::{begin, finish};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Newest-first page of messages; the caller must be a member
    #[instrument(skip(self))]
    pub async fn get_messages(
        &self,
        user_id: Snowflake,
        chat_id: Snowflake,
        page: MessagePage,
    ) -> ServiceResult<Vec<MessageView>> {
        let uow = self.ctx.unit_of_work().await?;
        guards::live_chat(uow.as_ref(), chat_id).await?;
        guards::member(uow.as_ref(), chat_id, user_id).await?;

        let query = MessageQuery {
            before: page.before,
            limit: page.limit(),
        };
        let messages = uow.messages().find_by_chat(chat_id, query).await?;

        let mut authors: HashMap<Snowflake, UserView> = HashMap::new();
        let mut views = Vec::with_capacity(messages.len());
        for message in &messages {
            let author = match authors.get(&message.author_id) {
                Some(author) => author.clone(),
                None => {
                    let author = render::user_by_id(uow.as_ref(), message.author_id).await?;
                    authors.insert(message.author_id, author.clone());
                    author
                }
            };
            views.push(MessageView::new(message, author));
        }
        Ok(views)
    }

    /// Post a message to a chat the caller belongs to
    #[instrument(skip(self, request), fields(chat_id = %request.chat_id))]
    pub async fn send_message(&self, user_id: Snowflake, request: SendMessageRequest) -> ServiceResult<MessageView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.send_message_in_tx(uow.as_ref(), user_id, request).await;
        finish(uow.as_ref(), result).await
    }

    async fn send_message_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageView> {
        let author = guards::verified_user(uow, user_id).await?;
        guards::live_chat(uow, request.chat_id).await?;
        guards::member(uow, request.chat_id, user_id).await?;

        let message = Message::new(self.ctx.generate_id(), request.chat_id, user_id, request.content);
        uow.messages().create(&message).await?;

        info!(message_id = %message.id, "Message sent");
        let author = render::public_user(uow, &author).await?;
        Ok(MessageView::new(&message, author))
    }

    /// Replace the content of the caller's own message
    #[instrument(skip(self, request))]
    pub async fn edit_message(
        &self,
        user_id: Snowflake,
        message_id: Snowflake,
        request: EditMessageRequest,
    ) -> ServiceResult<MessageView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = Self::edit_message_in_tx(uow.as_ref(), user_id, message_id, request.content).await;
        finish(uow.as_ref(), result).await
    }

    async fn edit_message_in_tx(
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        message_id: Snowflake,
        content: String,
    ) -> ServiceResult<MessageView> {
        let author = guards::verified_user(uow, user_id).await?;
        let (mut message, _) = Self::live_message(uow, message_id).await?;
        if message.author_id != user_id {
            return Err(DomainError::NotMessageAuthor.into());
        }

        message.edit(content);
        uow.messages().update(&message).await?;

        info!(%message_id, "Message edited");
        let author = render::public_user(uow, &author).await?;
        Ok(MessageView::new(&message, author))
    }

    /// Delete a message; group creators may delete anyone's message
    #[instrument(skip(self))]
    pub async fn delete_message(&self, user_id: Snowflake, message_id: Snowflake) -> ServiceResult<()> {
        let uow = begin(self.ctx).await?;
        let result = Self::delete_message_in_tx(uow.as_ref(), user_id, message_id).await;
        finish(uow.as_ref(), result).await
    }

    async fn delete_message_in_tx(uow: &dyn UnitOfWork, user_id: Snowflake, message_id: Snowflake) -> ServiceResult<()> {
        guards::verified_user(uow, user_id).await?;
        let (message, chat) = Self::live_message(uow, message_id).await?;

        if message.author_id != user_id {
            let moderates = chat.is_group()
                && uow
                    .members()
                    .find(chat.id, user_id)
                    .await?
                    .is_some_and(|m| m.is_creator());
            if !moderates {
                return Err(DomainError::NotMessageAuthor.into());
            }
        }

        uow.messages().delete(message_id).await?;

        info!(%message_id, "Message deleted");
        Ok(())
    }

    /// Message exists and its chat is not deleted
    async fn live_message(uow: &dyn UnitOfWork, message_id: Snowflake) -> ServiceResult<(Message, Chat)> {
        let message = uow
            .messages()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;
        let chat = guards::live_chat(uow, message.chat_id).await?;
        Ok((message, chat))
    }
}
