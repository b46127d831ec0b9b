//! Chat member model -> entity

use chat_core::entities::{ChatMember, MemberRole};
use chat_core::value_objects::Snowflake;
use chat_core::DomainError;

use crate::models::ChatMemberModel;

use super::corrupt;

impl TryFrom<ChatMemberModel> for ChatMember {
    type Error = DomainError;

    fn try_from(model: ChatMemberModel) -> Result<Self, Self::Error> {
        let role: MemberRole = model
            .role
            .parse()
            .map_err(|_| corrupt("chat_members", "role", &model.role))?;

        Ok(ChatMember {
            chat_id: Snowflake::new(model.chat_id),
            user_id: Snowflake::new(model.user_id),
            role,
            nickname: model.nickname,
            joined_at: model.joined_at,
        })
    }
}
