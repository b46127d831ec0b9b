//! Request DTOs for commands and queries
//!
//! Bodies implement `Deserialize` and `Validate`. The acting user is never
//! part of a body; services take it as a separate argument.

use std::borrow::Cow;

use chat_common::auth::password_strength;
use chat_core::entities::MESSAGE_MAX_LEN;
use chat_core::value_objects::validate_shortname;
use chat_core::Snowflake;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Default page size for message listings
pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;
/// Largest page a caller may request
pub const MAX_MESSAGE_LIMIT: i64 = 100;

fn validate_password(value: &str) -> Result<(), ValidationError> {
    password_strength(value)
        .map_err(|message| ValidationError::new("password_strength").with_message(Cow::Borrowed(message)))
}

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmEmailRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh request; the HTTP layer falls back to the `refresh_token` cookie
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteAccountRequest {
    #[validate(custom(function = "validate_shortname"))]
    pub shortname: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateShortnameRequest {
    #[validate(custom(function = "validate_shortname"))]
    pub shortname: String,
}

// ============================================================================
// Chat Requests
// ============================================================================

/// Open a one-to-one chat with `user_id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatRequest {
    pub user_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_group_visibility", skip_on_field_errors = false))]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default = "default_private")]
    pub is_private: bool,

    #[validate(custom(function = "validate_shortname"))]
    pub shortname: Option<String>,
}

fn default_private() -> bool {
    true
}

fn validate_group_visibility(request: &CreateGroupRequest) -> Result<(), ValidationError> {
    if !request.is_private && request.shortname.is_none() {
        return Err(ValidationError::new("shortname_required")
            .with_message(Cow::Borrowed("Public groups need a shortname")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MakePublicGroupRequest {
    #[validate(custom(function = "validate_shortname"))]
    pub shortname: String,
}

// ============================================================================
// Message Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub chat_id: Snowflake,

    #[validate(length(min = 1, max = MESSAGE_MAX_LEN, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    #[validate(length(min = 1, max = MESSAGE_MAX_LEN, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

/// Cursor pagination for message listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessagePage {
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

impl MessagePage {
    /// Limit clamped to `1..=100`, defaulting to 50
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_MESSAGE_LIMIT)
            .clamp(1, MAX_MESSAGE_LIMIT)
    }
}
