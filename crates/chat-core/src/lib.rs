//! # chat-core
//!
//! Domain layer containing entities, value objects, the error taxonomy, and the
//! repository / unit-of-work ports. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Chat, ChatMember, ChatType, Mention, MentionTarget, MemberRole, Message, RefreshToken,
    RefreshTokenState, User, DELETED_USER_NAME,
};
pub use error::{DomainError, ErrorKind};
pub use traits::{
    ChatRepository, EmailSender, MemberRepository, MentionRepository, MessageQuery,
    MessageRepository, RefreshTokenRepository, RepoResult, UnitOfWork, UnitOfWorkFactory,
    UserRepository,
};
pub use value_objects::{validate_shortname, Snowflake, SnowflakeGenerator, SnowflakeParseError};
