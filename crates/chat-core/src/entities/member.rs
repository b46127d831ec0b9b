//! Chat membership

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Creator,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(Self::Creator),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown member role: {other}")),
        }
    }
}

/// Row linking a user to a chat. Unique per `(chat_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub chat_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub nickname: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl ChatMember {
    pub fn new(chat_id: Snowflake, user_id: Snowflake, role: MemberRole) -> Self {
        Self {
            chat_id,
            user_id,
            role,
            nickname: None,
            joined_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_creator(&self) -> bool {
        self.role == MemberRole::Creator
    }
}
