//! In-memory persistence
//!
//! One [`MemoryStore`] holds every table behind a single async mutex. A unit
//! of work that begins a transaction keeps the lock until it commits or rolls
//! back, so transactions are fully serialized; rollback (or dropping the unit
//! of work) restores the snapshot taken at begin.
//!
//! A store built with [`MemoryStore::recording`] also logs the name of every
//! repository call (`"users.find_by_id"`, `"uow.commit"`, ...). Any store can
//! be told to fail a named operation.

mod repositories;
mod session;
mod unit_of_work;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chat_core::entities::{Chat, ChatMember, Mention, Message, RefreshToken, User};
use chat_core::{DomainError, RepoResult, Snowflake};
use tokio::sync::Mutex;

pub use repositories::{
    MemoryChatRepository, MemoryMemberRepository, MemoryMentionRepository,
    MemoryMessageRepository, MemoryRefreshTokenRepository, MemoryUserRepository,
};
pub use unit_of_work::{MemoryUnitOfWork, MemoryUnitOfWorkFactory};

#[derive(Debug, Clone)]
pub(crate) struct UserRow {
    pub user: User,
    pub password_hash: String,
}

/// Every table of the store
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub users: BTreeMap<Snowflake, UserRow>,
    pub chats: BTreeMap<Snowflake, Chat>,
    pub members: BTreeMap<(Snowflake, Snowflake), ChatMember>,
    pub messages: BTreeMap<Snowflake, Message>,
    pub mentions: BTreeMap<Snowflake, Mention>,
    pub refresh_tokens: BTreeMap<Snowflake, RefreshToken>,
}

#[derive(Debug, Default)]
struct StoreInner {
    state: Arc<Mutex<State>>,
    recording: bool,
    calls: parking_lot::Mutex<Vec<String>>,
    failures: parking_lot::Mutex<HashSet<String>>,
}

/// Shared handle to an in-memory database
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that keeps a log of every call, for tests
    pub fn recording() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                recording: true,
                ..StoreInner::default()
            }),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.inner.recording
    }

    /// Make every later call to `operation` fail with a database error
    pub fn fail_on(&self, operation: &str) {
        self.inner.failures.lock().insert(operation.to_string());
    }

    pub fn clear_failures(&self) {
        self.inner.failures.lock().clear();
    }

    /// Names of the calls made so far, oldest first; always empty unless recording
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().clear();
    }

    /// How often `operation` was called
    pub fn call_count(&self, operation: &str) -> usize {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|call| call.as_str() == operation)
            .count()
    }

    pub(crate) fn state(&self) -> Arc<Mutex<State>> {
        Arc::clone(&self.inner.state)
    }

    /// Log the call when recording, then fail it if a failure was injected
    pub(crate) fn record(&self, operation: &'static str) -> RepoResult<()> {
        if self.inner.recording {
            self.inner.calls.lock().push(operation.to_string());
        }
        if self.inner.failures.lock().contains(operation) {
            return Err(DomainError::Database(format!(
                "injected failure on {operation}"
            )));
        }
        Ok(())
    }
}
