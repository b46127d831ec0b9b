//! Authentication service
//!
//! Handles registration, email confirmation, login, token rotation and logout.

use chat_common::auth::{
    generate_confirmation_token, hash_password, hash_refresh_token, verify_password,
    IssuedRefreshToken,
};
use chat_common::confirmation_link;
use chat_core::entities::{RefreshToken, RefreshTokenState, User};
use chat_core::traits::UnitOfWork;
use chat_core::{DomainError, Snowflake};
use chrono::Utc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    AuthSession, ConfirmEmailRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RegisterRequest, UserView,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::render;
use super::transaction::{begin, finish};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new, unconfirmed account and send the confirmation link
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserView> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;

        let uow = begin(self.ctx).await?;
        let result = self
            .register_in_tx(uow.as_ref(), email, request.display_name, &password_hash)
            .await;
        finish(uow.as_ref(), result).await
    }

    async fn register_in_tx(
        &self,
        uow: &dyn UnitOfWork,
        email: String,
        display_name: String,
        password_hash: &str,
    ) -> ServiceResult<UserView> {
        if uow.users().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let token = generate_confirmation_token();
        let user = User::new(self.ctx.generate_id(), email, display_name, token.clone());
        uow.users().create(&user, password_hash).await?;

        let link = confirmation_link(self.ctx.confirmation_url(), &token);
        self.ctx
            .email_sender()
            .send_confirmation(&user.email, &user.display_name, &link)
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(UserView::owner(&user, None))
    }

    /// Mark the email behind a confirmation token as confirmed
    #[instrument(skip(self, request))]
    pub async fn confirm_email(&self, request: ConfirmEmailRequest) -> ServiceResult<UserView> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = Self::confirm_email_in_tx(uow.as_ref(), &request.token).await;
        finish(uow.as_ref(), result).await
    }

    async fn confirm_email_in_tx(uow: &dyn UnitOfWork, token: &str) -> ServiceResult<UserView> {
        let mut user = uow
            .users()
            .find_by_confirmation_token(token)
            .await?
            .ok_or(DomainError::InvalidConfirmationToken)?;

        if user.is_deleted() {
            return Err(DomainError::UserDeleted.into());
        }
        // Confirming clears the token, so this only trips on an inconsistent row
        if user.email_confirmed {
            return Err(DomainError::EmailAlreadyConfirmed.into());
        }

        user.confirm_email();
        uow.users().update(&user).await?;

        info!(user_id = %user.id, "Email confirmed");
        Ok(UserView::owner(&user, None))
    }

    /// Login with email and password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.login_in_tx(uow.as_ref(), &request).await;
        finish(uow.as_ref(), result).await
    }

    async fn login_in_tx(&self, uow: &dyn UnitOfWork, request: &LoginRequest) -> ServiceResult<AuthSession> {
        let email = normalize_email(&request.email);
        let Some(user) = uow.users().find_by_email(&email).await? else {
            warn!("Login failed: unknown email");
            return Err(DomainError::InvalidCredentials.into());
        };

        let password_hash = uow
            .users()
            .get_password_hash(user.id)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;
        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(DomainError::InvalidCredentials.into());
        }

        if user.is_deleted() {
            return Err(DomainError::UserDeleted.into());
        }
        if !user.email_confirmed {
            return Err(DomainError::EmailNotConfirmed.into());
        }

        let session = self.open_session(uow, &user).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(session)
    }

    /// Rotate a refresh token: revoke the presented one and issue a new pair
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        let uow = begin(self.ctx).await?;
        let result = self.refresh_in_tx(uow.as_ref(), &request.refresh_token).await;
        finish(uow.as_ref(), result).await
    }

    async fn refresh_in_tx(&self, uow: &dyn UnitOfWork, raw: &str) -> ServiceResult<AuthSession> {
        let token = uow
            .refresh_tokens()
            .find_by_hash(&hash_refresh_token(raw))
            .await?
            .ok_or(DomainError::RefreshTokenInvalid)?;

        match token.state_at(Utc::now()) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Revoked => {
                warn!(user_id = %token.user_id, "Revoked refresh token presented");
                return Err(DomainError::RefreshTokenRevoked.into());
            }
            RefreshTokenState::Expired => return Err(DomainError::RefreshTokenExpired.into()),
        }

        let user = uow
            .users()
            .find_by_id(token.user_id)
            .await?
            .ok_or(DomainError::UserNotFound(token.user_id))?;
        if user.is_deleted() {
            return Err(DomainError::UserDeleted.into());
        }

        uow.refresh_tokens().revoke(token.id).await?;
        let session = self.open_session(uow, &user).await?;

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(session)
    }

    /// Revoke the presented refresh token, or every active token of the caller
    #[instrument(skip(self, request))]
    pub async fn logout(&self, user_id: Snowflake, request: LogoutRequest) -> ServiceResult<u64> {
        let uow = begin(self.ctx).await?;
        let result = Self::logout_in_tx(uow.as_ref(), user_id, request.refresh_token.as_deref()).await;
        finish(uow.as_ref(), result).await
    }

    async fn logout_in_tx(uow: &dyn UnitOfWork, user_id: Snowflake, raw: Option<&str>) -> ServiceResult<u64> {
        if let Some(raw) = raw {
            let presented = uow.refresh_tokens().find_by_hash(&hash_refresh_token(raw)).await?;
            if let Some(token) = presented.filter(|t| {
                t.user_id == user_id && t.state_at(Utc::now()) == RefreshTokenState::Active
            }) {
                uow.refresh_tokens().revoke(token.id).await?;
                info!(%user_id, "Logged out one session");
                return Ok(1);
            }
        }

        let revoked = uow.refresh_tokens().revoke_all_for_user(user_id).await?;
        info!(%user_id, revoked, "Logged out all sessions");
        Ok(revoked)
    }

    /// Persist a fresh refresh token and mint the matching access token
    async fn open_session(&self, uow: &dyn UnitOfWork, user: &User) -> ServiceResult<AuthSession> {
        let issued = IssuedRefreshToken::generate();
        let ttl = self.ctx.refresh_token_ttl();
        let record = RefreshToken::new(self.ctx.generate_id(), user.id, issued.hash, Utc::now() + ttl);
        uow.refresh_tokens().create(&record).await?;

        let access = self.ctx.jwt_service().issue_access_token(user.id)?;
        let view = render::own_user(uow, user).await?;

        Ok(AuthSession::new(
            access.token,
            issued.raw,
            access.expires_in,
            ttl.num_seconds(),
            view,
        ))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
