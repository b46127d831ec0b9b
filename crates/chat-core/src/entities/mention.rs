//! Mention entity - the global shortname registry
//!
//! User and chat mentions share a single namespace: a shortname is owned by
//! exactly one user or one (public) group.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::Snowflake;

/// Owner of a mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MentionTarget {
    User(Snowflake),
    Chat(Snowflake),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub id: Snowflake,
    pub shortname: String,
    pub target: MentionTarget,
    pub created_at: DateTime<Utc>,
}

impl Mention {
    pub fn for_user(id: Snowflake, user_id: Snowflake, shortname: String) -> Self {
        Self::new(id, shortname, MentionTarget::User(user_id))
    }

    pub fn for_chat(id: Snowflake, chat_id: Snowflake, shortname: String) -> Self {
        Self::new(id, shortname, MentionTarget::Chat(chat_id))
    }

    fn new(id: Snowflake, shortname: String, target: MentionTarget) -> Self {
        Self {
            id,
            shortname,
            target,
            created_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        match self.target {
            MentionTarget::User(id) => Some(id),
            MentionTarget::Chat(_) => None,
        }
    }

    pub fn chat_id(&self) -> Option<Snowflake> {
        match self.target {
            MentionTarget::Chat(id) => Some(id),
            MentionTarget::User(_) => None,
        }
    }
}
