//! # chat-common
//!
//! Shared utilities including configuration, error handling, authentication,
//! outbound mail, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_confirmation_token, hash_password, hash_refresh_token, password_strength,
    verify_password, AccessToken, Claims, IssuedRefreshToken, JwtService,
};
pub use config::{
    AppConfig, AppSettings, AuthConfig, ConfigError, CorsConfig, DatabaseBackend,
    DatabaseConfig, Environment, JwtConfig, MaintenanceConfig, RateLimitConfig, ServerConfig,
    SnowflakeConfig,
};
pub use error::{status_for_kind, AppError, AppResult};
pub use mail::{confirmation_link, LogEmailSender};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
