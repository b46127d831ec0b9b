//! Connection sharing for one unit of work

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, instrument};

use chat_core::{DomainError, RepoResult};

use super::error::map_db_error;

/// Pool handle plus the optional open transaction of a unit of work
pub struct PgSession {
    pool: PgPool,
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

/// A connection borrowed for the duration of one query
pub(crate) enum SessionConnection<'a> {
    Transaction(MappedMutexGuard<'a, Transaction<'static, Postgres>>),
    Pooled(PoolConnection<Postgres>),
}

impl Deref for SessionConnection<'_> {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Transaction(tx) => tx,
            Self::Pooled(conn) => conn,
        }
    }
}

impl DerefMut for SessionConnection<'_> {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Transaction(tx) => &mut ***tx,
            Self::Pooled(conn) => &mut **conn,
        }
    }
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            tx: Mutex::new(None),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The open transaction if any, else a pooled connection
    pub(crate) async fn acquire(&self) -> RepoResult<SessionConnection<'_>> {
        let guard = self.tx.lock().await;
        // Early return keeps the mapped guard out of scope across the await below,
        // which rustc otherwise fails to prove `Send` for
        let _unlocked = match MutexGuard::try_map(guard, Option::as_mut) {
            Ok(tx) => return Ok(SessionConnection::Transaction(tx)),
            Err(unlocked) => unlocked,
        };
        let conn = self.pool.acquire().await.map_err(map_db_error)?;
        Ok(SessionConnection::Pooled(conn))
    }

    #[instrument(skip(self))]
    pub(crate) async fn begin(&self) -> RepoResult<()> {
        let mut slot = self.tx.lock().await;
        if slot.is_some() {
            return Err(DomainError::Internal(
                "a transaction is already open on this unit of work".to_string(),
            ));
        }
        *slot = Some(self.pool.begin().await.map_err(map_db_error)?);
        debug!("Transaction started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn commit(&self) -> RepoResult<()> {
        let tx = self.tx.lock().await.take().ok_or_else(|| {
            DomainError::Internal("commit without an open transaction".to_string())
        })?;
        tx.commit().await.map_err(map_db_error)?;
        debug!("Transaction committed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn rollback(&self) -> RepoResult<()> {
        let Some(tx) = self.tx.lock().await.take() else {
            return Ok(());
        };
        tx.rollback().await.map_err(map_db_error)?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession").finish_non_exhaustive()
    }
}
