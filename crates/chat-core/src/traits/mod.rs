//! Ports implemented by the infrastructure layer

mod email;
mod repositories;
mod unit_of_work;

pub use email::EmailSender;
pub use repositories::{
    ChatRepository, MemberRepository, MentionRepository, MessageQuery, MessageRepository,
    RefreshTokenRepository, RepoResult, UserRepository,
};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
