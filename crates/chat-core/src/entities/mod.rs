//! Domain entities - core business objects

mod chat;
mod member;
mod mention;
mod message;
mod refresh_token;
mod user;

pub use chat::{Chat, ChatType};
pub use member::{ChatMember, MemberRole};
pub use mention::{Mention, MentionTarget};
pub use message::{Message, MESSAGE_MAX_LEN};
pub use refresh_token::{RefreshToken, RefreshTokenState};
pub use user::{User, DELETED_USER_NAME};
