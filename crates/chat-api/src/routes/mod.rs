//! Route definitions
//!
//! All API routes organized by domain and mounted under /api.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{auth, chats, health, messages, users};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately so they
/// bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(chat_routes())
        .merge(group_routes())
        .merge(message_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/confirm-email", post(auth::confirm_email))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(users::get_current_user))
        .route("/users/me/complete", post(users::complete_account))
        .route("/users/me/shortname", put(users::update_shortname))
        .route("/users/shortname/:shortname", get(users::get_user_by_shortname))
        .route("/users/:user_id", get(users::get_user))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", get(chats::get_user_chats).post(chats::create_chat))
        .route("/chats/public/:shortname", get(chats::find_public_group))
        .route("/chats/:chat_id", get(chats::get_chat))
}

fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/chats/groups", post(chats::create_group))
        .route("/chats/groups/:group_id", delete(chats::delete_group))
        .route("/chats/groups/:group_id/public", post(chats::make_public))
        .route("/chats/groups/:group_id/private", post(chats::make_private))
        .route("/chats/groups/:group_id/join", post(chats::join_group))
        .route("/chats/groups/:group_id/leave", post(chats::leave_group))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/chat/:chat_id", get(messages::get_messages))
        .route(
            "/messages/:message_id",
            patch(messages::edit_message).delete(messages::delete_message),
        )
}
