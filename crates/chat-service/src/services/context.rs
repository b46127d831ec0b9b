//! Service context - dependency container for services
//!
//! Holds the unit-of-work factory, token services and the other collaborators
//! every request needs.

use std::sync::Arc;

use chat_common::auth::JwtService;
use chat_core::traits::{EmailSender, UnitOfWork, UnitOfWorkFactory};
use chat_core::{Snowflake, SnowflakeGenerator};
use chrono::Duration;

use super::error::{ServiceError, ServiceResult};

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL: i64 = 604_800;

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    email_sender: Arc<dyn EmailSender>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    refresh_token_ttl: Duration,
    confirmation_url: String,
}

impl ServiceContext {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        email_sender: Arc<dyn EmailSender>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        refresh_token_ttl: Duration,
        confirmation_url: String,
    ) -> Self {
        Self {
            uow_factory,
            email_sender,
            jwt_service,
            snowflake_generator,
            refresh_token_ttl,
            confirmation_url,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Open a request-scoped unit of work
    pub async fn unit_of_work(&self) -> ServiceResult<Box<dyn UnitOfWork>> {
        Ok(self.uow_factory.create().await?)
    }

    /// Connectivity check against the backing store
    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.uow_factory.ping().await?)
    }

    pub fn email_sender(&self) -> &dyn EmailSender {
        self.email_sender.as_ref()
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }

    /// Base URL the confirmation token is appended to
    pub fn confirmation_url(&self) -> &str {
        &self.confirmation_url
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("uow_factory", &"dyn UnitOfWorkFactory")
            .field("email_sender", &"dyn EmailSender")
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("confirmation_url", &self.confirmation_url)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    uow_factory: Option<Arc<dyn UnitOfWorkFactory>>,
    email_sender: Option<Arc<dyn EmailSender>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    refresh_token_ttl: Duration,
    confirmation_url: String,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            uow_factory: None,
            email_sender: None,
            jwt_service: None,
            snowflake_generator: None,
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL),
            confirmation_url: "http://localhost:8080/confirm-email".to_string(),
        }
    }

    pub fn uow_factory(mut self, factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        self.uow_factory = Some(factory);
        self
    }

    pub fn email_sender(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email_sender = Some(sender);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_ttl(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl = Duration::seconds(seconds);
        self
    }

    pub fn confirmation_url(mut self, url: impl Into<String>) -> Self {
        self.confirmation_url = url.into();
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.uow_factory.ok_or_else(|| missing("uow_factory"))?,
            self.email_sender.ok_or_else(|| missing("email_sender"))?,
            self.jwt_service.ok_or_else(|| missing("jwt_service"))?,
            self.snowflake_generator.ok_or_else(|| missing("snowflake_generator"))?,
            self.refresh_token_ttl,
            self.confirmation_url,
        ))
    }
}

fn missing(dependency: &'static str) -> ServiceError {
    ServiceError::field(dependency, "required", "dependency is required")
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
