//! Application configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first when present). Unset optional variables fall back to defaults; set
//! but unparsable values are rejected instead of silently defaulted.

use std::env;
use std::str::FromStr;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub maintenance: MaintenanceConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Listen address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which store backs the unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown database backend '{other}'")),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Required when `backend` is `Postgres`
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
    pub migrations_dir: String,
}

/// Access token signing
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds
    pub access_token_expiry: i64,
    /// Seconds
    pub refresh_token_expiry: i64,
}

/// Cookie and email confirmation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub cookie_secure: bool,
    /// Base of the link sent in confirmation emails; the token is appended as
    /// a `token` query parameter
    pub confirmation_url: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

/// Background sweeps
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// `0` disables the background task
    pub interval_secs: u64,
}

impl MaintenanceConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

const MAX_WORKER_ID: u16 = 1023;

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let env: Environment = parse_or("APP_ENV", Environment::Development)?;

        let backend: DatabaseBackend = parse_or("DATABASE_BACKEND", DatabaseBackend::Postgres)?;
        let url = env::var("DATABASE_URL").ok();
        if backend == DatabaseBackend::Postgres && url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let worker_id: u16 = parse_or("WORKER_ID", 0)?;
        if worker_id > MAX_WORKER_ID {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                format!("{worker_id} exceeds {MAX_WORKER_ID}"),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| "chat-server".to_string()),
                env,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_or("API_PORT", 8080)?,
            },
            database: DatabaseConfig {
                backend,
                url,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 5)?,
                run_migrations: parse_or("DATABASE_RUN_MIGRATIONS", true)?,
                migrations_dir: env::var("DATABASE_MIGRATIONS_DIR")
                    .unwrap_or_else(|_| "./migrations".to_string()),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_or("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
                refresh_token_expiry: parse_or("JWT_REFRESH_TOKEN_EXPIRY", 604_800)?,
            },
            auth: AuthConfig {
                cookie_secure: parse_or("AUTH_COOKIE_SECURE", env.is_production())?,
                confirmation_url: env::var("AUTH_CONFIRMATION_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/confirm-email".to_string()),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", 10)?,
                burst: parse_or("RATE_LIMIT_BURST", 50)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| split_list(&s))
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            maintenance: MaintenanceConfig {
                interval_secs: parse_or("MAINTENANCE_INTERVAL_SECS", 0)?,
            },
        })
    }
}

impl AppConfig {
    /// Development defaults on the in-memory backend, for tests and local demos
    #[must_use]
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: "chat-server".to_string(),
                env: Environment::Development,
            },
            api: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Memory,
                url: None,
                max_connections: 20,
                min_connections: 5,
                run_migrations: false,
                migrations_dir: "./migrations".to_string(),
            },
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                access_token_expiry: 900,
                refresh_token_expiry: 604_800,
            },
            auth: AuthConfig {
                cookie_secure: false,
                confirmation_url: "http://localhost:8080/confirm-email".to_string(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: 100,
                burst: 1000,
            },
            cors: CorsConfig::default(),
            snowflake: SnowflakeConfig { worker_id: 0 },
            maintenance: MaintenanceConfig { interval_secs: 0 },
        }
    }
}

/// Parse `var` if set, otherwise return `default`
fn parse_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(var, e.to_string())),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("Staging".parse(), Ok(Environment::Staging));
        assert!("qa".parse::<Environment>().is_err());
        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse(), Ok(DatabaseBackend::Memory));
        assert_eq!("PostgreSQL".parse(), Ok(DatabaseBackend::Postgres));
        assert!("sqlite".parse::<DatabaseBackend>().is_err());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" http://a.test, ,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_or_default_when_unset() {
        let value: u32 = parse_or("CHAT_COMMON_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_maintenance_toggle() {
        assert!(!MaintenanceConfig { interval_secs: 0 }.is_enabled());
        assert!(MaintenanceConfig { interval_secs: 60 }.is_enabled());
    }
}
