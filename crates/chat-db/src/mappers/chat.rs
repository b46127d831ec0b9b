//! Chat model -> entity

use chat_core::entities::{Chat, ChatType};
use chat_core::value_objects::Snowflake;
use chat_core::DomainError;

use crate::models::ChatModel;

use super::corrupt;

impl TryFrom<ChatModel> for Chat {
    type Error = DomainError;

    fn try_from(model: ChatModel) -> Result<Self, Self::Error> {
        let chat_type: ChatType = model
            .chat_type
            .parse()
            .map_err(|_| corrupt("chats", "chat_type", &model.chat_type))?;

        Ok(Chat {
            id: Snowflake::new(model.id),
            chat_type,
            name: model.name,
            description: model.description,
            is_private: model.is_private,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}
