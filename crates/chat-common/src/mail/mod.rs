//! Outbound email
//!
//! [`LogEmailSender`] writes the confirmation link to the log instead of
//! talking to an SMTP server.

use async_trait::async_trait;
use chat_core::{EmailSender, RepoResult};
use tracing::info;

/// Build the link sent in confirmation emails
#[must_use]
pub fn confirmation_link(base_url: &str, token: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}token={token}")
}

#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_confirmation(&self, email: &str, display_name: &str, link: &str) -> RepoResult<()> {
        info!(
            to = %email,
            name = %display_name,
            link = %link,
            "Confirmation email"
        );
        Ok(())
    }
}
