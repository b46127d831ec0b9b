//! Model to entity mappers
//!
//! Plain column copies use `From`; columns holding enum tags use `TryFrom`
//! and surface an unknown tag as a database error.

mod chat;
mod member;
mod mention;
mod message;
mod refresh_token;
mod user;

use chat_core::DomainError;

pub(crate) use mention::owner_columns;

fn corrupt(table: &str, column: &str, value: &str) -> DomainError {
    DomainError::Database(format!("unexpected {table}.{column} value '{value}'"))
}
