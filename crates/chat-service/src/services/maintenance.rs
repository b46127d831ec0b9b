//! Background housekeeping
//!
//! Sweeps run one transaction each and are never called from a request path.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::dto::SweepReport;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::transaction::{begin, finish};

pub struct MaintenanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MaintenanceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Delete refresh tokens that expired before `now`
    #[instrument(skip(self))]
    pub async fn sweep_expired_refresh_tokens(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        let uow = begin(self.ctx).await?;
        let result: ServiceResult<u64> = uow.refresh_tokens().delete_expired(now).await.map_err(Into::into);
        let removed = finish(uow.as_ref(), result).await?;

        if removed > 0 {
            info!(removed, "Expired refresh tokens swept");
        }
        Ok(removed)
    }

    /// Delete mentions whose owning user or chat is soft-deleted
    #[instrument(skip(self))]
    pub async fn sweep_orphaned_mentions(&self) -> ServiceResult<u64> {
        let uow = begin(self.ctx).await?;
        let result: ServiceResult<u64> = uow.mentions().delete_orphaned().await.map_err(Into::into);
        let removed = finish(uow.as_ref(), result).await?;

        if removed > 0 {
            info!(removed, "Orphaned mentions swept");
        }
        Ok(removed)
    }

    pub async fn run(&self, now: DateTime<Utc>) -> ServiceResult<SweepReport> {
        Ok(SweepReport {
            expired_refresh_tokens: self.sweep_expired_refresh_tokens(now).await?,
            orphaned_mentions: self.sweep_orphaned_mentions().await?,
        })
    }
}
