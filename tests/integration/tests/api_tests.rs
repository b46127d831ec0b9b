//! API Integration Tests
//!
//! Most tests run against the in-memory store and need nothing else. Tests
//! named `*_postgres` also need `DATABASE_URL` and skip without it.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_data, assert_error, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health", None).await.expect("Request failed");
    assert!(response.headers().contains_key("x-request-id"));
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready", None).await.expect("Request failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_and_confirm() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();

    let response = server.post("/api/auth/register", None, &request).await.unwrap();
    let user: UserResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(user.email.as_deref(), Some(request.email.as_str()));
    assert!(!user.email_confirmed);
    assert!(!user.is_verified);

    let token = server.mailbox.confirmation_token(&request.email).unwrap();
    let response = server
        .post("/api/auth/confirm-email", None, &json!({ "token": token }))
        .await
        .unwrap();
    let user: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert!(user.email_confirmed);

    // The token is single-use
    let response = server
        .post("/api/auth/confirm-email", None, &json!({ "token": token }))
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "INVALID_CONFIRMATION_TOKEN");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();

    server.post("/api/auth/register", None, &request).await.unwrap();

    let response = server.post("/api/auth/register", None, &request).await.unwrap();
    let err = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(err.error.code, "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_validation_details() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post(
            "/api/auth/register",
            None,
            &json!({"email": "nope", "password": "letters-only", "display_name": ""}),
        )
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "VALIDATION_ERROR");

    let details = err.error.details.unwrap();
    for field in ["email", "password", "display_name"] {
        assert!(details[field].is_array(), "missing details for {field}");
    }
}

#[tokio::test]
async fn test_login_and_refresh() {
    let server = TestServer::start().await.unwrap();
    let (_, session) = server.confirmed_user().await.unwrap();
    assert_eq!(session.token_type, "Bearer");
    assert_eq!(session.expires_in, 900);

    let response = server
        .post(
            "/api/auth/refresh",
            None,
            &json!({ "refresh_token": session.refresh_token }),
        )
        .await
        .unwrap();
    let refreshed: SessionResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_ne!(refreshed.refresh_token, session.refresh_token);

    // Reusing a rotated token fails
    let response = server
        .post(
            "/api/auth/refresh",
            None,
            &json!({ "refresh_token": session.refresh_token }),
        )
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "REFRESH_TOKEN_REVOKED");
}

#[tokio::test]
async fn test_cookie_session() {
    let server = TestServer::start().await.unwrap();
    let (request, _) = server.confirmed_user().await.unwrap();

    // The client's cookie store now holds the session set by login
    let response = server.get("/api/users/me", None).await.unwrap();
    let me: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.email.as_deref(), Some(request.email.as_str()));

    let response = server.post_empty("/api/auth/refresh", None).await.unwrap();
    let _: SessionResponse = assert_data(response, StatusCode::OK).await.unwrap();

    let response = server.post_empty("/api/auth/logout", None).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/api/users/me", None).await.unwrap();
    let err = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error.code, "MISSING_AUTH");
}

#[tokio::test]
async fn test_logout_revokes_refresh_tokens() {
    let server = TestServer::start().await.unwrap();
    let (_, session) = server.confirmed_user().await.unwrap();

    let response = server
        .post(
            "/api/auth/logout",
            Some(&session.access_token),
            &json!({ "refresh_token": session.refresh_token }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post(
            "/api/auth/refresh",
            None,
            &json!({ "refresh_token": session.refresh_token }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_complete_account_and_shortname() {
    let server = TestServer::start().await.unwrap();
    let shortname = unique_shortname("ada");
    let (session, user) = server.verified_user(&shortname).await.unwrap();
    assert!(user.is_verified);
    assert_eq!(user.shortname.as_deref(), Some(shortname.as_str()));

    let token = Some(session.access_token.as_str());

    // Completing twice is rejected
    let response = server
        .post("/api/users/me/complete", token, &json!({ "shortname": unique_shortname("ada") }))
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "USER_ALREADY_VERIFIED");

    let renamed = unique_shortname("lovelace");
    let response = server
        .put("/api/users/me/shortname", token, &json!({ "shortname": renamed }))
        .await
        .unwrap();
    let user: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(user.shortname.as_deref(), Some(renamed.as_str()));

    // The old shortname is free again, the new one resolves
    let response = server
        .get(&format!("/api/users/shortname/{shortname}"), token)
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get(&format!("/api/users/shortname/{renamed}"), token)
        .await
        .unwrap();
    let found: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(found.id, user.id);
    assert!(found.email.is_none());

    // Personal chat was created on completion
    let response = server.get("/api/chats", token).await.unwrap();
    let chats: Vec<ChatResponse> = assert_data(response, StatusCode::OK).await.unwrap();
    assert!(chats.iter().any(|c| c.kind == "personal"));
}

// ============================================================================
// Chat and Message Tests
// ============================================================================

#[tokio::test]
async fn test_one_to_one_chat_flow() {
    let server = TestServer::start().await.unwrap();
    let (ada, _) = server.verified_user(&unique_shortname("ada")).await.unwrap();
    let (grace, grace_user) = server.verified_user(&unique_shortname("grace")).await.unwrap();

    let ada_token = Some(ada.access_token.as_str());
    let grace_token = Some(grace.access_token.as_str());

    let response = server
        .post("/api/chats", ada_token, &json!({ "user_id": grace_user.id }))
        .await
        .unwrap();
    let chat: ChatResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(chat.kind, "one_to_one");
    assert_eq!(chat.peer.unwrap().id, grace_user.id);

    let response = server
        .post("/api/chats", grace_token, &json!({ "user_id": ada.user.id }))
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(err.message, "Chat has already been created");

    let response = server
        .post(
            "/api/messages",
            ada_token,
            &json!({ "chat_id": chat.id, "content": "hello" }),
        )
        .await
        .unwrap();
    let message: MessageResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(message.chat_id, chat.id);

    let response = server
        .patch(
            &format!("/api/messages/{}", message.id),
            ada_token,
            &json!({ "content": "hello there" }),
        )
        .await
        .unwrap();
    let edited: MessageResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(edited.content, "hello there");
    assert!(edited.edited_at.is_some());

    let response = server
        .get(&format!("/api/messages/chat/{}", chat.id), grace_token)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].author.id, ada.user.id);

    let response = server
        .delete(&format!("/api/messages/{}", message.id), grace_token)
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "NOT_MESSAGE_AUTHOR");
}

#[tokio::test]
async fn test_outsiders_cannot_read_chat() {
    let server = TestServer::start().await.unwrap();
    let (ada, _) = server.verified_user(&unique_shortname("ada")).await.unwrap();
    let (grace, grace_user) = server.verified_user(&unique_shortname("grace")).await.unwrap();
    let (eve, _) = server.verified_user(&unique_shortname("eve")).await.unwrap();

    let response = server
        .post("/api/chats", Some(&ada.access_token), &json!({ "user_id": grace_user.id }))
        .await
        .unwrap();
    let chat: ChatResponse = assert_data(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get(&format!("/api/messages/chat/{}", chat.id), Some(&eve.access_token))
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error.code, "NOT_CHAT_MEMBER");

    let response = server
        .post(
            "/api/messages",
            Some(&eve.access_token),
            &json!({ "chat_id": chat.id, "content": "let me in" }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    drop(grace);
}

#[tokio::test]
async fn test_public_group_flow() {
    let server = TestServer::start().await.unwrap();
    let (owner, _) = server.verified_user(&unique_shortname("owner")).await.unwrap();
    let (guest, _) = server.verified_user(&unique_shortname("guest")).await.unwrap();
    let owner_token = Some(owner.access_token.as_str());
    let guest_token = Some(guest.access_token.as_str());

    let response = server
        .post(
            "/api/chats/groups",
            owner_token,
            &json!({ "name": "Rustaceans", "description": "All things Rust" }),
        )
        .await
        .unwrap();
    let group: ChatResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(group.is_private, Some(true));

    let response = server
        .post_empty(&format!("/api/chats/groups/{}/private", group.id), owner_token)
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.message, "Group is private");

    let shortname = unique_shortname("rust");
    let response = server
        .post(
            &format!("/api/chats/groups/{}/public", group.id),
            owner_token,
            &json!({ "shortname": shortname }),
        )
        .await
        .unwrap();
    let public: ChatResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(public.is_private, Some(false));
    assert_eq!(public.shortname.as_deref(), Some(shortname.as_str()));

    let response = server
        .get(&format!("/api/chats/public/{shortname}"), guest_token)
        .await
        .unwrap();
    let found: ChatResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(found.id, group.id);
    assert!(found.role.is_none());

    let response = server
        .post_empty(&format!("/api/chats/groups/{}/join", group.id), guest_token)
        .await
        .unwrap();
    let joined: ChatResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(joined.member_count, Some(2));
    assert_eq!(joined.role.as_deref(), Some("member"));

    let response = server
        .post_empty(&format!("/api/chats/groups/{}/join", group.id), guest_token)
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "ALREADY_MEMBER");

    let response = server
        .post_empty(&format!("/api/chats/groups/{}/leave", group.id), owner_token)
        .await
        .unwrap();
    let err = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error.code, "CREATOR_CANNOT_LEAVE");

    let response = server
        .post_empty(&format!("/api/chats/groups/{}/private", group.id), owner_token)
        .await
        .unwrap();
    let private: ChatResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(private.is_private, Some(true));
    assert!(private.shortname.is_none());

    let response = server
        .get(&format!("/api/chats/public/{shortname}"), guest_token)
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test]
async fn test_group_lifecycle_postgres() {
    let Some(server) = TestServer::start_postgres().await.unwrap() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let (owner, _) = server.verified_user(&unique_shortname("pgown")).await.unwrap();
    let token = Some(owner.access_token.as_str());
    let shortname = unique_shortname("pggrp");

    let response = server
        .post(
            "/api/chats/groups",
            token,
            &json!({ "name": "Postgres", "is_private": false, "shortname": shortname }),
        )
        .await
        .unwrap();
    let group: ChatResponse = assert_data(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(group.role.as_deref(), Some("creator"));

    let response = server
        .post(
            "/api/messages",
            token,
            &json!({ "chat_id": group.id, "content": "persisted" }),
        )
        .await
        .unwrap();
    let _: MessageResponse = assert_data(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .delete(&format!("/api/chats/groups/{}", group.id), token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/api/chats/{}", group.id), token).await.unwrap();
    let deleted: ChatResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(deleted.kind, "deleted");

    // The released shortname can be claimed again
    let response = server
        .put("/api/users/me/shortname", token, &json!({ "shortname": shortname }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}
