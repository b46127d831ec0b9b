//! Data transfer objects
//!
//! - Request DTOs with validation for command and query inputs
//! - Views serialized back to API clients

pub mod requests;
pub mod responses;

pub use requests::{
    CompleteAccountRequest, ConfirmEmailRequest, CreateChatRequest, CreateGroupRequest,
    EditMessageRequest, LoginRequest, LogoutRequest, MakePublicGroupRequest, MessagePage,
    RefreshTokenRequest, RegisterRequest, SendMessageRequest, UpdateShortnameRequest,
    DEFAULT_MESSAGE_LIMIT, MAX_MESSAGE_LIMIT,
};

pub use responses::{
    AuthSession, ChatView, HealthChecks, HealthResponse, MessageView, ReadinessResponse,
    SweepReport, UserView,
};
