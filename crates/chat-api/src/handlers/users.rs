//! User handlers

use axum::extract::State;
use chat_service::{CompleteAccountRequest, UpdateShortnameRequest, UserService, UserView};

use crate::extractors::{AuthUser, ShortnamePath, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<UserView>> {
    let service = UserService::new(state.service_context());
    let user = service.get_current_user(auth.user_id).await?;
    Ok(ApiJson(user))
}

/// POST /api/users/me/complete
pub async fn complete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CompleteAccountRequest>,
) -> ApiResult<ApiJson<UserView>> {
    let service = UserService::new(state.service_context());
    let user = service.complete_account(auth.user_id, request).await?;
    Ok(ApiJson(user))
}

/// PUT /api/users/me/shortname
pub async fn update_shortname(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateShortnameRequest>,
) -> ApiResult<ApiJson<UserView>> {
    let service = UserService::new(state.service_context());
    let user = service.update_shortname(auth.user_id, request).await?;
    Ok(ApiJson(user))
}

/// GET /api/users/shortname/:shortname
pub async fn get_user_by_shortname(
    State(state): State<AppState>,
    _auth: AuthUser,
    ShortnamePath(shortname): ShortnamePath,
) -> ApiResult<ApiJson<UserView>> {
    let service = UserService::new(state.service_context());
    let user = service.get_user_by_shortname(&shortname).await?;
    Ok(ApiJson(user))
}

/// GET /api/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<ApiJson<UserView>> {
    let service = UserService::new(state.service_context());
    let user = service.get_user(user_id).await?;
    Ok(ApiJson(user))
}
