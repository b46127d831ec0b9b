//! Authentication extractor
//!
//! The access token is read from an `Authorization: Bearer` header, falling
//! back to the `access_token` cookie set by login.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chat_common::AppError;
use chat_core::Snowflake;

use crate::handlers::auth::ACCESS_TOKEN_COOKIE;
use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user extracted from the access token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

impl AuthUser {
    pub fn new(user_id: Snowflake) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
        {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) => {
                let jar = CookieJar::from_headers(&parts.headers);
                jar.get(ACCESS_TOKEN_COOKIE)
                    .map(|cookie| cookie.value().to_string())
                    .ok_or(AppError::MissingAuth)?
            }
        };

        let app_state = AppState::from_ref(state);
        let claims = app_state
            .jwt_service()
            .validate_access_token(&token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                e
            })?;

        Ok(AuthUser::new(claims.sid))
    }
}
