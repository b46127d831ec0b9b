//! Response DTOs (views)
//!
//! All views implement `Serialize`. Snowflake IDs serialize as strings for
//! JavaScript compatibility.

use chat_core::entities::{Chat, ChatType, MemberRole, Message, User, DELETED_USER_NAME};
use chat_core::Snowflake;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Auth Responses
// ============================================================================

/// Tokens handed out by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Raw refresh token; only its digest is stored
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
    pub user: UserView,
}

impl AuthSession {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        refresh_expires_in: i64,
        user: UserView,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_expires_in,
            user,
        }
    }
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: Snowflake,
    pub display_name: String,
    pub shortname: Option<String>,
    /// Only present when a user looks at their own account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_verified: bool,
    pub email_confirmed: bool,
    pub is_deleted: bool,
}

impl UserView {
    /// Full view of the caller's own account
    pub fn owner(user: &User, shortname: Option<String>) -> Self {
        Self {
            email: Some(user.email.clone()),
            ..Self::public(user, shortname)
        }
    }

    /// View of another user; soft-deleted users render as the placeholder
    pub fn public(user: &User, shortname: Option<String>) -> Self {
        if user.is_deleted() {
            return Self::deleted(user.id);
        }
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            shortname,
            email: None,
            is_verified: user.is_verified,
            email_confirmed: user.email_confirmed,
            is_deleted: false,
        }
    }

    pub fn deleted(id: Snowflake) -> Self {
        Self {
            id,
            display_name: DELETED_USER_NAME.to_string(),
            shortname: None,
            email: None,
            is_verified: false,
            email_confirmed: false,
            is_deleted: true,
        }
    }
}

// ============================================================================
// Chat Responses
// ============================================================================

/// Chat as seen by one viewer, selected by chat type and deletion flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatView {
    Personal {
        id: Snowflake,
        created_at: DateTime<Utc>,
    },
    OneToOne {
        id: Snowflake,
        peer: UserView,
        created_at: DateTime<Utc>,
    },
    Group {
        id: Snowflake,
        name: String,
        description: Option<String>,
        is_private: bool,
        shortname: Option<String>,
        member_count: i64,
        /// Viewer's role, `None` for non-members
        role: Option<MemberRole>,
        created_at: DateTime<Utc>,
    },
    Deleted {
        id: Snowflake,
    },
}

impl ChatView {
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Personal { id, .. }
            | Self::OneToOne { id, .. }
            | Self::Group { id, .. }
            | Self::Deleted { id } => *id,
        }
    }

    pub fn personal(chat: &Chat) -> Self {
        Self::Personal {
            id: chat.id,
            created_at: chat.created_at,
        }
    }

    pub fn one_to_one(chat: &Chat, peer: UserView) -> Self {
        Self::OneToOne {
            id: chat.id,
            peer,
            created_at: chat.created_at,
        }
    }

    pub fn group(
        chat: &Chat,
        shortname: Option<String>,
        member_count: i64,
        role: Option<MemberRole>,
    ) -> Self {
        debug_assert_eq!(chat.chat_type, ChatType::Group);
        Self::Group {
            id: chat.id,
            name: chat.name.clone().unwrap_or_default(),
            description: chat.description.clone(),
            is_private: chat.is_private,
            shortname,
            member_count,
            role,
            created_at: chat.created_at,
        }
    }
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: Snowflake,
    pub chat_id: Snowflake,
    pub author: UserView,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl MessageView {
    pub fn new(message: &Message, author: UserView) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            author,
            content: message.content.clone(),
            created_at: message.created_at,
            edited_at: message.edited_at,
        }
    }
}

// ============================================================================
// Maintenance / Health Responses
// ============================================================================

/// Rows removed by one maintenance pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired_refresh_tokens: u64,
    pub orphaned_mentions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Snowflake::new(7),
            "ada@example.com".to_string(),
            "Ada".to_string(),
            "token".to_string(),
        )
    }

    #[test]
    fn test_public_view_hides_email() {
        let view = UserView::public(&user(), Some("ada".to_string()));
        assert!(view.email.is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["id"], "7");

        let owner = UserView::owner(&user(), None);
        assert_eq!(owner.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_deleted_user_placeholder() {
        let mut user = user();
        user.deleted_at = Some(Utc::now());

        let view = UserView::public(&user, Some("ada".to_string()));
        assert_eq!(view.display_name, "Deleted User");
        assert!(view.shortname.is_none());
        assert!(view.is_deleted);
    }

    #[test]
    fn test_chat_view_tagging() {
        let group = Chat::group(Snowflake::new(3), "Rustaceans".to_string(), None, false);
        let view = ChatView::group(&group, Some("rustaceans".to_string()), 2, Some(MemberRole::Creator));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["role"], "creator");
        assert_eq!(json["member_count"], 2);

        let json = serde_json::to_value(ChatView::Deleted { id: Snowflake::new(3) }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "deleted", "id": "3"}));
    }

    #[test]
    fn test_readiness_response() {
        assert!(ReadinessResponse::ready(true).is_ready());
        let not_ready = ReadinessResponse::ready(false);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.database, "unhealthy");
    }
}
