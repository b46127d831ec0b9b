//! PostgreSQL adapters
//!
//! Every repository of a unit of work shares one [`PgSession`]: while a
//! transaction is open they all run on it, otherwise each call checks out a
//! pooled connection.

/// The live-row predicate for a table alias. Every query that must hide
/// soft-deleted rows builds its filter from this macro.
macro_rules! live {
    ($alias:literal) => {
        concat!($alias, ".deleted_at IS NULL")
    };
}

mod chat;
mod error;
mod member;
mod mention;
mod message;
mod refresh_token;
mod session;
mod unit_of_work;
mod user;

pub use chat::PgChatRepository;
pub use member::PgMemberRepository;
pub use mention::PgMentionRepository;
pub use message::PgMessageRepository;
pub use refresh_token::PgRefreshTokenRepository;
pub use session::PgSession;
pub use unit_of_work::{PgUnitOfWork, PgUnitOfWorkFactory};
pub use user::PgUserRepository;
