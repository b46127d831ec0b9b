//! Mention model -> entity

use chat_core::entities::{Mention, MentionTarget};
use chat_core::value_objects::Snowflake;
use chat_core::DomainError;

use crate::models::MentionModel;

impl TryFrom<MentionModel> for Mention {
    type Error = DomainError;

    fn try_from(model: MentionModel) -> Result<Self, Self::Error> {
        let target = match (model.user_id, model.chat_id) {
            (Some(user_id), None) => MentionTarget::User(Snowflake::new(user_id)),
            (None, Some(chat_id)) => MentionTarget::Chat(Snowflake::new(chat_id)),
            _ => {
                return Err(DomainError::Database(format!(
                    "mention {} must reference exactly one owner",
                    model.id
                )))
            }
        };

        Ok(Mention {
            id: Snowflake::new(model.id),
            shortname: model.shortname,
            target,
            created_at: model.created_at,
        })
    }
}

/// Owner columns for an insert: `(user_id, chat_id)`
pub(crate) fn owner_columns(target: MentionTarget) -> (Option<i64>, Option<i64>) {
    match target {
        MentionTarget::User(id) => (Some(id.into_inner()), None),
        MentionTarget::Chat(id) => (None, Some(id.into_inner())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(user_id: Option<i64>, chat_id: Option<i64>) -> MentionModel {
        MentionModel {
            id: 1,
            shortname: "ferris".to_string(),
            user_id,
            chat_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_resolution() {
        let user = Mention::try_from(model(Some(5), None)).unwrap();
        assert_eq!(user.user_id(), Some(Snowflake::new(5)));

        let chat = Mention::try_from(model(None, Some(6))).unwrap();
        assert_eq!(chat.chat_id(), Some(Snowflake::new(6)));

        assert!(Mention::try_from(model(Some(5), Some(6))).is_err());
        assert!(Mention::try_from(model(None, None)).is_err());
    }

    #[test]
    fn test_owner_columns() {
        assert_eq!(owner_columns(MentionTarget::User(Snowflake::new(3))), (Some(3), None));
        assert_eq!(owner_columns(MentionTarget::Chat(Snowflake::new(4))), (None, Some(4)));
    }
}
