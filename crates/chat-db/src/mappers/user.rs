//! User model -> entity

use chat_core::entities::User;
use chat_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            email: model.email,
            display_name: model.display_name,
            is_verified: model.is_verified,
            email_confirmed: model.email_confirmed,
            confirmation_token: model.confirmation_token,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}
