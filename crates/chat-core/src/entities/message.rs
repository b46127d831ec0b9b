//! Message entity - a chat message

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Maximum message length in characters
pub const MESSAGE_MAX_LEN: u64 = 4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub chat_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(id: Snowflake, chat_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        Self {
            id,
            chat_id,
            author_id,
            content,
            created_at: Utc::now(),
            edited_at: None,
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.edited_at = Some(Utc::now());
    }
}
