//! Authentication handlers
//!
//! Login and refresh return the session in the body and also set it as
//! HTTP-only cookies; logout clears them.

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chat_service::{
    AuthService, AuthSession, ConfirmEmailRequest, LoginRequest, LogoutRequest,
    RefreshTokenRequest, RegisterRequest, UserView,
};

use crate::extractors::{AuthUser, OptionalValidatedJson, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created, Done};
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// The refresh cookie is only sent back to the auth endpoints
const REFRESH_COOKIE_PATH: &str = "/api/auth";

fn auth_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(path)
        .build()
}

fn with_session_cookies(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.clone(),
        "/",
        secure,
    ))
    .add(auth_cookie(
        REFRESH_TOKEN_COOKIE,
        session.refresh_token.clone(),
        REFRESH_COOKIE_PATH,
        secure,
    ))
}

fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path(REFRESH_COOKIE_PATH))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<UserView>> {
    let service = AuthService::new(state.service_context());
    let user = service.register(request).await?;
    Ok(Created(user))
}

/// POST /api/auth/confirm-email
pub async fn confirm_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ConfirmEmailRequest>,
) -> ApiResult<ApiJson<UserView>> {
    let service = AuthService::new(state.service_context());
    let user = service.confirm_email(request).await?;
    Ok(ApiJson(user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, ApiJson<AuthSession>)> {
    let service = AuthService::new(state.service_context());
    let session = service.login(request).await?;
    let jar = with_session_cookies(jar, &session, state.cookie_secure());
    Ok((jar, ApiJson(session)))
}

/// POST /api/auth/refresh
///
/// The token comes from the body when present, otherwise from the cookie.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    OptionalValidatedJson(mut request): OptionalValidatedJson<RefreshTokenRequest>,
) -> ApiResult<(CookieJar, ApiJson<AuthSession>)> {
    if request.refresh_token.is_empty() {
        if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
            request.refresh_token = cookie.value().to_string();
        }
    }

    let service = AuthService::new(state.service_context());
    let session = service.refresh(request).await?;
    let jar = with_session_cookies(jar, &session, state.cookie_secure());
    Ok((jar, ApiJson(session)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    OptionalValidatedJson(mut request): OptionalValidatedJson<LogoutRequest>,
) -> ApiResult<(CookieJar, Done)> {
    if request.refresh_token.is_none() {
        request.refresh_token = jar
            .get(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string());
    }

    let service = AuthService::new(state.service_context());
    service.logout(auth.user_id, request).await?;
    Ok((without_session_cookies(jar), Done("Logged out")))
}
