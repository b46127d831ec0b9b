//! Chat member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chat_members table
#[derive(Debug, Clone, FromRow)]
pub struct ChatMemberModel {
    pub chat_id: i64,
    pub user_id: i64,
    /// `creator` or `member`
    pub role: String,
    pub nickname: Option<String>,
    pub joined_at: DateTime<Utc>,
}
