//! In-memory fixtures shared by the service tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_common::auth::{hash_password, JwtService};
use chat_core::entities::{Chat, ChatMember, MemberRole, Mention, User};
use chat_core::traits::{EmailSender, UnitOfWork};
use chat_core::{DomainError, RepoResult, SnowflakeGenerator};
use chat_db::{MemoryStore, MemoryUnitOfWork, MemoryUnitOfWorkFactory};

use super::context::ServiceContext;

pub(crate) const PASSWORD: &str = "correct-horse-42";

/// Captures confirmation links; can be switched to fail
#[derive(Default)]
pub(crate) struct RecordingEmailSender {
    pub links: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingEmailSender {
    pub fn last_token(&self) -> Option<String> {
        let links = self.links.lock().unwrap();
        links
            .last()
            .and_then(|link| link.split("token=").nth(1))
            .map(str::to_string)
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_confirmation(&self, _email: &str, _name: &str, link: &str) -> RepoResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::ExternalService("smtp unavailable".to_string()));
        }
        self.links.lock().unwrap().push(link.to_string());
        Ok(())
    }
}

pub(crate) struct Harness {
    pub store: MemoryStore,
    pub ctx: ServiceContext,
    pub emails: Arc<RecordingEmailSender>,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::recording();
        let emails = Arc::new(RecordingEmailSender::default());
        let ctx = ServiceContext::builder()
            .uow_factory(Arc::new(MemoryUnitOfWorkFactory::new(store.clone())))
            .email_sender(emails.clone())
            .jwt_service(Arc::new(JwtService::new("test-secret", 900)))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .refresh_token_ttl(3600)
            .confirmation_url("http://localhost/confirm")
            .build()
            .unwrap();

        Self { store, ctx, emails }
    }

    /// Autocommit unit of work for seeding and inspection
    pub fn uow(&self) -> MemoryUnitOfWork {
        MemoryUnitOfWork::new(self.store.clone())
    }

    /// Confirmed but not yet completed account
    pub async fn seed_confirmed(&self, email: &str) -> User {
        let mut user = User::new(
            self.ctx.generate_id(),
            email.to_string(),
            email.split('@').next().unwrap_or(email).to_string(),
            format!("confirm-{email}"),
        );
        user.confirm_email();
        let hash = hash_password(PASSWORD).unwrap();
        self.uow().users().create(&user, &hash).await.unwrap();
        self.store.clear_calls();
        user
    }

    /// Completed account owning `shortname`
    pub async fn seed_verified(&self, shortname: &str) -> User {
        let mut user = self.seed_confirmed(&format!("{shortname}@example.com")).await;
        user.complete(None);
        let uow = self.uow();
        uow.users().update(&user).await.unwrap();
        let mention = Mention::for_user(self.ctx.generate_id(), user.id, shortname.to_string());
        uow.mentions().create(&mention).await.unwrap();
        self.store.clear_calls();
        user
    }

    pub async fn seed_group(&self, creator: &User, shortname: Option<&str>) -> Chat {
        let chat = Chat::group(
            self.ctx.generate_id(),
            "Rustaceans".to_string(),
            None,
            shortname.is_none(),
        );
        let uow = self.uow();
        uow.chats().create(&chat).await.unwrap();
        uow.members()
            .create(&ChatMember::new(chat.id, creator.id, MemberRole::Creator))
            .await
            .unwrap();
        if let Some(shortname) = shortname {
            let mention = Mention::for_chat(self.ctx.generate_id(), chat.id, shortname.to_string());
            uow.mentions().create(&mention).await.unwrap();
        }
        self.store.clear_calls();
        chat
    }

    pub async fn add_member(&self, chat: &Chat, user: &User) {
        self.uow()
            .members()
            .create(&ChatMember::new(chat.id, user.id, MemberRole::Member))
            .await
            .unwrap();
        self.store.clear_calls();
    }

    pub async fn soft_delete_user(&self, user: &User) {
        self.uow().users().delete(user.id).await.unwrap();
        self.store.clear_calls();
    }

    /// Calls recorded since the last clear, excluding the transaction markers
    pub fn repository_calls(&self) -> Vec<String> {
        self.store
            .calls()
            .into_iter()
            .filter(|call| !call.starts_with("uow."))
            .collect()
    }
}
