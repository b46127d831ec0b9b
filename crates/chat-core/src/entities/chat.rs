//! Chat entity - a conversation container

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// Single-member chat every completed account owns
    Personal,
    /// Private chat between exactly two users
    OneToOne,
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::OneToOne => "one_to_one",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "one_to_one" => Ok(Self::OneToOne),
            "group" => Ok(Self::Group),
            other => Err(format!("unknown chat type: {other}")),
        }
    }
}

/// Chat entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: Snowflake,
    pub chat_type: ChatType,
    /// Only groups carry a name
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Chat {
    fn with_type(id: Snowflake, chat_type: ChatType) -> Self {
        let now = Utc::now();
        Self {
            id,
            chat_type,
            name: None,
            description: None,
            is_private: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn personal(id: Snowflake) -> Self {
        Self::with_type(id, ChatType::Personal)
    }

    pub fn one_to_one(id: Snowflake) -> Self {
        Self::with_type(id, ChatType::OneToOne)
    }

    pub fn group(id: Snowflake, name: String, description: Option<String>, is_private: bool) -> Self {
        Self {
            name: Some(name),
            description,
            is_private,
            ..Self::with_type(id, ChatType::Group)
        }
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        self.chat_type == ChatType::Group
    }

    /// A public group is a group that is not private
    #[inline]
    pub fn is_public_group(&self) -> bool {
        self.is_group() && !self.is_private
    }

    pub fn set_private(&mut self, is_private: bool) {
        self.is_private = is_private;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_type_str_round_trip() {
        for chat_type in [ChatType::Personal, ChatType::OneToOne, ChatType::Group] {
            assert_eq!(chat_type.as_str().parse::<ChatType>(), Ok(chat_type));
        }
        assert!("channel".parse::<ChatType>().is_err());
    }

    #[test]
    fn test_constructors() {
        let dm = Chat::one_to_one(Snowflake::new(1));
        assert!(dm.is_private);
        assert!(!dm.is_group());
        assert!(dm.name.is_none());

        let group = Chat::group(Snowflake::new(2), "Rustaceans".to_string(), None, false);
        assert!(group.is_public_group());
        assert_eq!(group.name.as_deref(), Some("Rustaceans"));
    }
}
