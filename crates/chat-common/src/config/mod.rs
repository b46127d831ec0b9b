//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AuthConfig, ConfigError, CorsConfig, DatabaseBackend,
    DatabaseConfig, Environment, JwtConfig, MaintenanceConfig, RateLimitConfig, ServerConfig,
    SnowflakeConfig,
};
