//! Server setup and initialization
//!
//! Wires the configured store into a [`ServiceContext`], builds the router
//! and runs it until ctrl-c.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chat_common::{AppConfig, AppError, DatabaseBackend, JwtService, LogEmailSender};
use chat_core::{DomainError, EmailSender, SnowflakeGenerator, UnitOfWorkFactory};
use chat_db::{
    create_pool, run_migrations, MemoryStore, MemoryUnitOfWorkFactory, PgUnitOfWorkFactory,
    PoolConfig,
};
use chat_service::{MaintenanceService, ServiceContextBuilder};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// # Errors
/// Returns `AppError::Config` if the rate limit settings are rejected
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Connect to the configured store and build the application state
///
/// # Errors
/// Fails if PostgreSQL is unreachable or a migration fails
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let uow_factory: Arc<dyn UnitOfWorkFactory> = match config.database.backend {
        DatabaseBackend::Postgres => {
            let pool_config = PoolConfig::from_app(&config.database)
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".to_string()))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&pool_config)
                .await
                .map_err(|e| AppError::Domain(DomainError::Database(e.to_string())))?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                run_migrations(&pool, Path::new(&config.database.migrations_dir))
                    .await
                    .map_err(AppError::internal)?;
            }

            Arc::new(PgUnitOfWorkFactory::new(pool))
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryUnitOfWorkFactory::new(MemoryStore::new()))
        }
    };

    create_app_state_with(config, uow_factory, Arc::new(LogEmailSender::new()))
}

/// Build the application state around an existing store and mail sender
///
/// # Errors
/// Returns `AppError::Config` if the service context is incomplete
pub fn create_app_state_with(
    config: AppConfig,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    email_sender: Arc<dyn EmailSender>,
) -> Result<AppState, AppError> {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .uow_factory(uow_factory)
        .email_sender(email_sender)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .refresh_token_ttl(config.jwt.refresh_token_expiry)
        .confirmation_url(config.auth.confirmation_url.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Periodically purge expired refresh tokens and orphaned mentions
///
/// Returns `None` when the interval is configured as `0`.
pub fn spawn_maintenance(state: AppState) -> Option<JoinHandle<()>> {
    let maintenance = &state.config().maintenance;
    if !maintenance.is_enabled() {
        return None;
    }
    let period = Duration::from_secs(maintenance.interval_secs);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let service = MaintenanceService::new(state.service_context());
            match service.run(Utc::now()).await {
                Ok(report) => info!(
                    expired_refresh_tokens = report.expired_refresh_tokens,
                    orphaned_mentions = report.orphaned_mentions,
                    "Maintenance sweep finished"
                ),
                Err(e) => error!(error = %e, "Maintenance sweep failed"),
            }
        }
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Serve `app` on an already bound listener until ctrl-c
///
/// # Errors
/// Returns an error if the server fails while running
pub async fn run_server(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
///
/// # Errors
/// Fails on startup errors (store, bind) or if the server stops abnormally
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let maintenance = spawn_maintenance(state.clone());
    let app = create_app(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    let result = run_server(listener, app).await;
    if let Some(handle) = maintenance {
        handle.abort();
    }
    result
}
