//! Mention database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for mentions table
///
/// Exactly one of `user_id` / `chat_id` is set (enforced by a CHECK constraint).
#[derive(Debug, Clone, FromRow)]
pub struct MentionModel {
    pub id: i64,
    pub shortname: String,
    pub user_id: Option<i64>,
    pub chat_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
