//! Domain errors - business precondition failures and wrapped infrastructure errors
//!
//! Every guard in the application layer fails with one of these variants. The
//! display string is the fixed, user-facing message; `code()` is the stable
//! machine-readable tag and `kind()` drives the HTTP status mapping.

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Coarse classification used for status mapping and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    /// Business precondition failed (400)
    Precondition,
    Unauthorized,
    Forbidden,
    Conflict,
    /// Target was soft-deleted (410)
    Gone,
    Infrastructure,
    ExternalService,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("User not found")]
    UserNotFound(Snowflake),

    #[error("Chat not found")]
    ChatNotFound(Snowflake),

    #[error("Message not found")]
    MessageNotFound(Snowflake),

    // =========================================================================
    // Business Preconditions
    // =========================================================================
    #[error("User is not verified")]
    UserNotVerified,

    #[error("User has already been verified")]
    UserAlreadyVerified,

    #[error("Email is not confirmed")]
    EmailNotConfirmed,

    #[error("Email has already been confirmed")]
    EmailAlreadyConfirmed,

    #[error("Invalid confirmation token")]
    InvalidConfirmationToken,

    #[error("Chat is not a group")]
    NotAGroup,

    #[error("Group is public")]
    GroupIsPublic,

    #[error("Group is private")]
    GroupIsPrivate,

    #[error("User is already a member of this chat")]
    AlreadyMember,

    #[error("The group creator cannot leave the group")]
    CreatorCannotLeave,

    // =========================================================================
    // Authentication
    // =========================================================================
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Refresh token is invalid")]
    RefreshTokenInvalid,

    #[error("Refresh token has been revoked")]
    RefreshTokenRevoked,

    #[error("Refresh token has expired")]
    RefreshTokenExpired,

    // =========================================================================
    // Authorization
    // =========================================================================
    #[error("Only the group creator can do this")]
    NotGroupCreator,

    #[error("User is not a member of this chat")]
    NotChatMember,

    #[error("Only the author can modify this message")]
    NotMessageAuthor,

    // =========================================================================
    // Conflicts
    // =========================================================================
    #[error("Shortname has already been taken")]
    ShortnameTaken,

    #[error("Chat has already been created")]
    ChatAlreadyExists,

    #[error("Email is already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Soft-deleted targets
    // =========================================================================
    #[error("User has been deleted")]
    UserDeleted,

    #[error("Chat has been deleted")]
    ChatDeleted,

    // =========================================================================
    // Infrastructure (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ChatNotFound(_) => "CHAT_NOT_FOUND",
            Self::MessageNotFound(_) => "MESSAGE_NOT_FOUND",

            Self::UserNotVerified => "USER_NOT_VERIFIED",
            Self::UserAlreadyVerified => "USER_ALREADY_VERIFIED",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::EmailAlreadyConfirmed => "EMAIL_ALREADY_CONFIRMED",
            Self::InvalidConfirmationToken => "INVALID_CONFIRMATION_TOKEN",
            Self::NotAGroup => "NOT_A_GROUP",
            Self::GroupIsPublic => "GROUP_IS_PUBLIC",
            Self::GroupIsPrivate => "GROUP_IS_PRIVATE",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::CreatorCannotLeave => "CREATOR_CANNOT_LEAVE",

            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::RefreshTokenInvalid => "REFRESH_TOKEN_INVALID",
            Self::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",

            Self::NotGroupCreator => "NOT_GROUP_CREATOR",
            Self::NotChatMember => "NOT_CHAT_MEMBER",
            Self::NotMessageAuthor => "NOT_MESSAGE_AUTHOR",

            Self::ShortnameTaken => "SHORTNAME_TAKEN",
            Self::ChatAlreadyExists => "CHAT_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            Self::UserDeleted => "USER_DELETED",
            Self::ChatDeleted => "CHAT_DELETED",

            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::ChatNotFound(_) | Self::MessageNotFound(_) => {
                ErrorKind::NotFound
            }

            Self::UserNotVerified
            | Self::UserAlreadyVerified
            | Self::EmailNotConfirmed
            | Self::EmailAlreadyConfirmed
            | Self::InvalidConfirmationToken
            | Self::NotAGroup
            | Self::GroupIsPublic
            | Self::GroupIsPrivate
            | Self::AlreadyMember
            | Self::CreatorCannotLeave => ErrorKind::Precondition,

            Self::InvalidCredentials
            | Self::RefreshTokenInvalid
            | Self::RefreshTokenRevoked
            | Self::RefreshTokenExpired => ErrorKind::Unauthorized,

            Self::NotGroupCreator | Self::NotChatMember | Self::NotMessageAuthor => {
                ErrorKind::Forbidden
            }

            Self::ShortnameTaken | Self::ChatAlreadyExists | Self::EmailAlreadyExists => {
                ErrorKind::Conflict
            }

            Self::UserDeleted | Self::ChatDeleted => ErrorKind::Gone,

            Self::Database(_) | Self::Internal(_) => ErrorKind::Infrastructure,
            Self::ExternalService(_) => ErrorKind::ExternalService,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Infrastructure failures are logged and propagated, never reworded
    #[inline]
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Infrastructure | ErrorKind::ExternalService
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(DomainError::UserNotFound(Snowflake::new(9)).to_string(), "User not found");
        assert_eq!(DomainError::GroupIsPublic.to_string(), "Group is public");
        assert_eq!(DomainError::GroupIsPrivate.to_string(), "Group is private");
        assert_eq!(
            DomainError::ShortnameTaken.to_string(),
            "Shortname has already been taken"
        );
        assert_eq!(
            DomainError::ChatAlreadyExists.to_string(),
            "Chat has already been created"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(DomainError::ChatNotFound(Snowflake::new(1)).kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::UserNotVerified.kind(), ErrorKind::Precondition);
        assert_eq!(DomainError::RefreshTokenExpired.kind(), ErrorKind::Unauthorized);
        assert_eq!(DomainError::NotGroupCreator.kind(), ErrorKind::Forbidden);
        assert_eq!(DomainError::ShortnameTaken.kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::ChatDeleted.kind(), ErrorKind::Gone);
        assert_eq!(DomainError::Database("boom".into()).kind(), ErrorKind::Infrastructure);
        assert_eq!(
            DomainError::ExternalService("smtp".into()).kind(),
            ErrorKind::ExternalService
        );
    }

    #[test]
    fn test_is_infrastructure() {
        assert!(DomainError::Database("x".into()).is_infrastructure());
        assert!(DomainError::ExternalService("x".into()).is_infrastructure());
        assert!(!DomainError::UserDeleted.is_infrastructure());
    }
}
