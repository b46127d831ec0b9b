//! User service
//!
//! Account completion, shortname changes and user lookups.

use chat_core::entities::{Chat, ChatMember, MemberRole, Mention, MentionTarget};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CompleteAccountRequest, UpdateShortnameRequest, UserView};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guards;
use super::render;
use super::transaction::{begin, finish};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reserve the user's shortname, mark the account verified and create
    /// their personal chat
    #[instrument(skip(self, request), fields(shortname = %request.shortname))]
    pub async fn complete_account(
        &self,
        user_id: Snowflake,
        request: CompleteAccountRequest,
    ) -> ServiceResult<UserView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.complete_account_in_tx(uow.as_ref(), user_id, request).await;
        finish(uow.as_ref(), result).await
    }

    async fn complete_account_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        request: CompleteAccountRequest,
    ) -> ServiceResult<UserView> {
        let mut user = uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        if user.is_verified {
            return Err(DomainError::UserAlreadyVerified.into());
        }
        if user.is_deleted() {
            return Err(DomainError::UserDeleted.into());
        }
        if !user.email_confirmed {
            return Err(DomainError::EmailNotConfirmed.into());
        }
        guards::shortname_available(uow, &request.shortname).await?;

        let mention = Mention::for_user(self.ctx.generate_id(), user.id, request.shortname);
        uow.mentions().create(&mention).await?;

        user.complete(request.display_name);
        uow.users().update(&user).await?;

        let personal = Chat::personal(self.ctx.generate_id());
        uow.chats().create(&personal).await?;
        uow.members()
            .create(&ChatMember::new(personal.id, user.id, MemberRole::Creator))
            .await?;

        info!(%user_id, chat_id = %personal.id, "Account completed");
        Ok(UserView::owner(&user, Some(mention.shortname)))
    }

    /// Change the caller's shortname; keeping the same one is a no-op
    #[instrument(skip(self, request), fields(shortname = %request.shortname))]
    pub async fn update_shortname(
        &self,
        user_id: Snowflake,
        request: UpdateShortnameRequest,
    ) -> ServiceResult<UserView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.update_shortname_in_tx(uow.as_ref(), user_id, request.shortname).await;
        finish(uow.as_ref(), result).await
    }

    async fn update_shortname_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        user_id: Snowflake,
        shortname: String,
    ) -> ServiceResult<UserView> {
        let user = guards::verified_user(uow, user_id).await?;

        match uow.mentions().find_by_user(user_id).await? {
            Some(current) if current.shortname == shortname => {}
            Some(current) => {
                guards::shortname_available(uow, &shortname).await?;
                uow.mentions().update_shortname(current.id, &shortname).await?;
                info!(%user_id, old = %current.shortname, new = %shortname, "Shortname updated");
            }
            None => {
                guards::shortname_available(uow, &shortname).await?;
                let mention = Mention::for_user(self.ctx.generate_id(), user_id, shortname.clone());
                uow.mentions().create(&mention).await?;
                info!(%user_id, new = %shortname, "Shortname registered");
            }
        }

        Ok(UserView::owner(&user, Some(shortname)))
    }

    /// Get the caller's own account
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: Snowflake) -> ServiceResult<UserView> {
        let uow = self.ctx.unit_of_work().await?;
        let user = uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        if user.is_deleted() {
            return Err(DomainError::UserDeleted.into());
        }

        render::own_user(uow.as_ref(), &user).await
    }

    /// Get any user; deleted users come back as the placeholder view
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserView> {
        let uow = self.ctx.unit_of_work().await?;
        let user = uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        render::public_user(uow.as_ref(), &user).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_shortname(&self, shortname: &str) -> ServiceResult<UserView> {
        let not_found = || DomainError::UserNotFound(Snowflake::default());

        let uow = self.ctx.unit_of_work().await?;
        let mention = uow
            .mentions()
            .find_by_shortname(shortname)
            .await?
            .ok_or_else(not_found)?;
        let MentionTarget::User(user_id) = mention.target else {
            return Err(not_found().into());
        };

        let user = uow
            .users()
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(not_found)?;

        Ok(UserView::public(&user, Some(mention.shortname)))
    }
}
