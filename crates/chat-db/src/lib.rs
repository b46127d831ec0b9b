//! # chat-db
//!
//! Persistence adapters for the repository and unit-of-work ports defined in
//! `chat-core`.
//!
//! - [`postgres`]: SQLx repositories sharing one [`PgSession`] per unit of work
//! - [`memory`]: a process-local store with the same semantics, used by tests
//!   and by the `memory` backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, PgUnitOfWorkFactory, PoolConfig};
//! use chat_core::UnitOfWorkFactory;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/chat")).await?;
//!     let factory = PgUnitOfWorkFactory::new(pool);
//!
//!     let uow = factory.create().await?;
//!     uow.begin_transaction().await?;
//!     // ... repositories via uow.users(), uow.chats(), ...
//!     uow.commit_transaction().await?;
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod models;
pub mod pool;
pub mod postgres;

mod mappers;

pub use memory::{MemoryStore, MemoryUnitOfWork, MemoryUnitOfWorkFactory};
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use postgres::{PgSession, PgUnitOfWork, PgUnitOfWorkFactory};
