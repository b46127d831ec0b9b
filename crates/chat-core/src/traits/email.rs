//! Outbound email port

use async_trait::async_trait;

use super::repositories::RepoResult;

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver the email-confirmation link for a freshly registered account.
    ///
    /// Failures surface as `DomainError::ExternalService`.
    async fn send_confirmation(&self, email: &str, display_name: &str, link: &str)
        -> RepoResult<()>;
}
