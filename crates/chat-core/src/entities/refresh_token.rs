//! Refresh token entity
//!
//! Only the SHA-256 digest of the opaque token is persisted.

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Lifecycle state, derived from the row at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            token_hash,
            expires_at,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    /// Revocation wins over expiry
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn state(&self) -> RefreshTokenState {
        self.state_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_transitions() {
        let now = Utc::now();
        let mut token = RefreshToken::new(
            Snowflake::new(1),
            Snowflake::new(2),
            "hash".to_string(),
            now + Duration::minutes(5),
        );

        assert_eq!(token.state_at(now), RefreshTokenState::Active);
        assert_eq!(token.state_at(now + Duration::minutes(5)), RefreshTokenState::Expired);

        token.revoked_at = Some(now);
        assert_eq!(token.state_at(now), RefreshTokenState::Revoked);
        assert_eq!(token.state_at(now + Duration::hours(1)), RefreshTokenState::Revoked);
    }
}
