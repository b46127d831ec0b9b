//! Message handlers

use axum::extract::State;
use chat_service::{EditMessageRequest, MessageService, MessageView, SendMessageRequest};

use crate::extractors::{AuthUser, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created, Done};
use crate::state::AppState;

/// GET /api/messages/chat/:chat_id?before=&limit=
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(chat_id): SnowflakePath,
    Pagination(page): Pagination,
) -> ApiResult<ApiJson<Vec<MessageView>>> {
    let service = MessageService::new(state.service_context());
    let messages = service.get_messages(auth.user_id, chat_id, page).await?;
    Ok(ApiJson(messages))
}

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<MessageView>> {
    let service = MessageService::new(state.service_context());
    let message = service.send_message(auth.user_id, request).await?;
    Ok(Created(message))
}

/// PATCH /api/messages/:message_id
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath,
    ValidatedJson(request): ValidatedJson<EditMessageRequest>,
) -> ApiResult<ApiJson<MessageView>> {
    let service = MessageService::new(state.service_context());
    let message = service.edit_message(auth.user_id, message_id, request).await?;
    Ok(ApiJson(message))
}

/// DELETE /api/messages/:message_id
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath,
) -> ApiResult<Done> {
    let service = MessageService::new(state.service_context());
    service.delete_message(auth.user_id, message_id).await?;
    Ok(Done("Message deleted"))
}
