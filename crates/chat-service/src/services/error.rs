//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use chat_common::{status_for_kind, AppError};
use chat_core::{DomainError, ErrorKind};
use thiserror::Error;
use validator::ValidationErrors;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Guard failure or wrapped infrastructure error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Token, hashing and configuration errors
    #[error(transparent)]
    App(#[from] AppError),

    /// Field-shape validation, raised before any repository call
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),
}

impl ServiceError {
    /// Build a single-field validation error
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(
            field,
            validator::ValidationError::new(code).with_message(message.into()),
        );
        Self::Validation(errors)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => status_for_kind(e.kind()),
            Self::App(e) => e.status_code(),
            Self::Validation(_) => 400,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Infrastructure failures are logged at error level and never reworded
    pub fn is_infrastructure(&self) -> bool {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => e.is_infrastructure(),
            Self::App(e) => e.is_server_error(),
            Self::Validation(_) => false,
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.domain().map(DomainError::kind)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Validation(errors) => AppError::Validation(errors.to_string()),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Snowflake;

    #[test]
    fn test_domain_error_mapping() {
        let err = ServiceError::from(DomainError::ChatNotFound(Snowflake::new(1)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "CHAT_NOT_FOUND");
        assert_eq!(err.to_string(), "Chat not found");

        let err = ServiceError::from(DomainError::UserDeleted);
        assert_eq!(err.status_code(), 410);
    }

    #[test]
    fn test_validation_error() {
        let err = ServiceError::field("user_id", "self_chat", "Cannot create a chat with yourself");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let field = &errors.field_errors()["user_id"][0];
        assert_eq!(field.message.as_deref(), Some("Cannot create a chat with yourself"));
    }

    #[test]
    fn test_infrastructure_detection() {
        assert!(ServiceError::from(DomainError::Database("down".into())).is_infrastructure());
        assert!(ServiceError::from(AppError::internal(anyhow::anyhow!("boom"))).is_infrastructure());
        assert!(!ServiceError::from(DomainError::ShortnameTaken).is_infrastructure());
        assert!(!ServiceError::from(AppError::InvalidToken).is_infrastructure());
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::from(DomainError::NotGroupCreator).into();
        assert_eq!(app_err.status_code(), 403);
    }
}
