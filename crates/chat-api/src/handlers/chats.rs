//! Chat and group handlers
//!
//! One-to-one chats and listings go through [`ChatService`]; everything under
//! `/chats/groups` goes through [`GroupService`].

use axum::extract::State;
use chat_service::{
    ChatService, ChatView, CreateChatRequest, CreateGroupRequest, GroupService,
    MakePublicGroupRequest,
};

use crate::extractors::{AuthUser, ShortnamePath, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created, Done};
use crate::state::AppState;

/// GET /api/chats
pub async fn get_user_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<Vec<ChatView>>> {
    let service = ChatService::new(state.service_context());
    let chats = service.get_user_chats(auth.user_id).await?;
    Ok(ApiJson(chats))
}

/// POST /api/chats
///
/// The caller is always the first participant.
pub async fn create_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChatRequest>,
) -> ApiResult<Created<ChatView>> {
    let service = ChatService::new(state.service_context());
    let chat = service.create_chat(auth.user_id, request).await?;
    Ok(Created(chat))
}

/// GET /api/chats/public/:shortname
pub async fn find_public_group(
    State(state): State<AppState>,
    auth: AuthUser,
    ShortnamePath(shortname): ShortnamePath,
) -> ApiResult<ApiJson<ChatView>> {
    let service = ChatService::new(state.service_context());
    let chat = service.find_public_group(auth.user_id, &shortname).await?;
    Ok(ApiJson(chat))
}

/// GET /api/chats/:chat_id
pub async fn get_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(chat_id): SnowflakePath,
) -> ApiResult<ApiJson<ChatView>> {
    let service = ChatService::new(state.service_context());
    let chat = service.get_chat(auth.user_id, chat_id).await?;
    Ok(ApiJson(chat))
}

/// POST /api/chats/groups
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<ChatView>> {
    let service = GroupService::new(state.service_context());
    let group = service.create_group(auth.user_id, request).await?;
    Ok(Created(group))
}

/// DELETE /api/chats/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(group_id): SnowflakePath,
) -> ApiResult<Done> {
    let service = GroupService::new(state.service_context());
    service.delete_group(auth.user_id, group_id).await?;
    Ok(Done("Group deleted"))
}

/// POST /api/chats/groups/:group_id/public
pub async fn make_public(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(group_id): SnowflakePath,
    ValidatedJson(request): ValidatedJson<MakePublicGroupRequest>,
) -> ApiResult<ApiJson<ChatView>> {
    let service = GroupService::new(state.service_context());
    let group = service.make_public(auth.user_id, group_id, request).await?;
    Ok(ApiJson(group))
}

/// POST /api/chats/groups/:group_id/private
pub async fn make_private(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(group_id): SnowflakePath,
) -> ApiResult<ApiJson<ChatView>> {
    let service = GroupService::new(state.service_context());
    let group = service.make_private(auth.user_id, group_id).await?;
    Ok(ApiJson(group))
}

/// POST /api/chats/groups/:group_id/join
pub async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(group_id): SnowflakePath,
) -> ApiResult<ApiJson<ChatView>> {
    let service = GroupService::new(state.service_context());
    let group = service.join(auth.user_id, group_id).await?;
    Ok(ApiJson(group))
}

/// POST /api/chats/groups/:group_id/leave
pub async fn leave_group(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(group_id): SnowflakePath,
) -> ApiResult<Done> {
    let service = GroupService::new(state.service_context());
    service.leave(auth.user_id, group_id).await?;
    Ok(Done("Left group"))
}
