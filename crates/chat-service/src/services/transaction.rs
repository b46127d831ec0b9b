//! Transaction boundary shared by every guarded command

use chat_core::traits::UnitOfWork;
use tracing::{debug, error};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Create a unit of work and open its transaction
pub(crate) async fn begin(ctx: &ServiceContext) -> ServiceResult<Box<dyn UnitOfWork>> {
    let uow = ctx.unit_of_work().await?;
    uow.begin_transaction().await?;
    Ok(uow)
}

/// Commit on success; otherwise roll back exactly once and propagate
pub(crate) async fn finish<T>(uow: &dyn UnitOfWork, result: ServiceResult<T>) -> ServiceResult<T> {
    match result {
        Ok(value) => match uow.commit_transaction().await {
            Ok(()) => Ok(value),
            Err(err) => {
                error!(error = %err, "Commit failed");
                rollback(uow).await;
                Err(err.into())
            }
        },
        Err(err) => {
            if err.is_infrastructure() {
                error!(error = %err, code = err.error_code(), "Rolling back after infrastructure error");
            } else {
                debug!(code = err.error_code(), reason = %err, "Command rejected");
            }
            rollback(uow).await;
            Err(err)
        }
    }
}

async fn rollback(uow: &dyn UnitOfWork) {
    if let Err(err) = uow.rollback_transaction().await {
        error!(error = %err, "Rollback failed");
    }
}
