//! # chat-service
//!
//! Application layer: guarded state-transition commands, read-only queries and
//! the view models handed to the HTTP layer. Every command runs inside one
//! unit-of-work transaction obtained from [`ServiceContext`].

pub mod dto;
pub mod services;

pub use dto::*;
pub use services::*;
