//! Per unit-of-work view of a [`MemoryStore`]

use tokio::sync::{Mutex, OwnedMutexGuard};

use chat_core::{DomainError, RepoResult};

use super::{MemoryStore, State};

/// Holds the store lock for the lifetime of a transaction
struct OpenTransaction {
    guard: OwnedMutexGuard<State>,
    /// `None` once committed
    snapshot: Option<State>,
}

impl Drop for OpenTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

pub(crate) struct MemorySession {
    store: MemoryStore,
    tx: Mutex<Option<OpenTransaction>>,
}

impl MemorySession {
    pub(crate) fn new(store: MemoryStore) -> Self {
        Self {
            store,
            tx: Mutex::new(None),
        }
    }

    /// Run `f` against the transaction's view, or against the store directly
    /// when no transaction is open
    pub(crate) async fn run<R, F>(&self, operation: &'static str, f: F) -> RepoResult<R>
    where
        F: FnOnce(&mut State) -> RepoResult<R> + Send,
    {
        self.store.record(operation)?;

        let mut tx = self.tx.lock().await;
        if let Some(open) = tx.as_mut() {
            return f(&mut *open.guard);
        }
        drop(tx);

        let state = self.store.state();
        let mut state = state.lock().await;
        f(&mut *state)
    }

    pub(crate) async fn begin(&self) -> RepoResult<()> {
        self.store.record("uow.begin")?;

        let mut tx = self.tx.lock().await;
        if tx.is_some() {
            return Err(DomainError::Internal(
                "a transaction is already open on this unit of work".to_string(),
            ));
        }
        let guard = self.store.state().lock_owned().await;
        let snapshot = guard.clone();
        *tx = Some(OpenTransaction {
            guard,
            snapshot: Some(snapshot),
        });
        Ok(())
    }

    pub(crate) async fn commit(&self) -> RepoResult<()> {
        self.store.record("uow.commit")?;

        let mut open = self.tx.lock().await.take().ok_or_else(|| {
            DomainError::Internal("commit without an open transaction".to_string())
        })?;
        open.snapshot = None;
        Ok(())
    }

    pub(crate) async fn rollback(&self) -> RepoResult<()> {
        self.store.record("uow.rollback")?;

        // Dropping the open transaction restores the snapshot
        drop(self.tx.lock().await.take());
        Ok(())
    }
}
