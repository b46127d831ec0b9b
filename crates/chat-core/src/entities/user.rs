//! User entity - an account that can join chats

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Display name rendered in place of a soft-deleted user
pub const DELETED_USER_NAME: &str = "Deleted User";

/// User account
///
/// The password hash is not part of the entity; repositories store it next to
/// the row and hand it out only through `UserRepository::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: String,
    pub display_name: String,
    /// Set once the account is completed (shortname reserved)
    pub is_verified: bool,
    pub email_confirmed: bool,
    pub confirmation_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a freshly registered, unconfirmed user
    pub fn new(
        id: Snowflake,
        email: String,
        display_name: String,
        confirmation_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            display_name,
            is_verified: false,
            email_confirmed: false,
            confirmation_token: Some(confirmation_token),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Mark the email address as confirmed and burn the token
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.confirmation_token = None;
        self.updated_at = Utc::now();
    }

    /// Flip the account to verified after the shortname is reserved
    pub fn complete(&mut self, display_name: Option<String>) {
        if let Some(name) = display_name {
            self.display_name = name;
        }
        self.is_verified = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Snowflake::new(1),
            "ada@example.com".to_string(),
            "Ada".to_string(),
            "token".to_string(),
        )
    }

    #[test]
    fn test_new_user_is_unconfirmed() {
        let user = user();
        assert!(!user.is_verified);
        assert!(!user.email_confirmed);
        assert!(!user.is_deleted());
        assert_eq!(user.confirmation_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_confirm_email_clears_token() {
        let mut user = user();
        user.confirm_email();
        assert!(user.email_confirmed);
        assert!(user.confirmation_token.is_none());
    }

    #[test]
    fn test_complete_keeps_name_when_absent() {
        let mut user = user();
        user.complete(None);
        assert!(user.is_verified);
        assert_eq!(user.display_name, "Ada");

        user.complete(Some("Ada L.".to_string()));
        assert_eq!(user.display_name, "Ada L.");
    }
}
