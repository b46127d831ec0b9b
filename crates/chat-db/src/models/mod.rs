//! Database models - SQLx-compatible structs for PostgreSQL tables

mod chat;
mod member;
mod mention;
mod message;
mod refresh_token;
mod user;

pub use chat::ChatModel;
pub use member::ChatMemberModel;
pub use mention::MentionModel;
pub use message::MessageModel;
pub use refresh_token::RefreshTokenModel;
pub use user::UserModel;
