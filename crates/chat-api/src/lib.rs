//! # chat-api
//!
//! REST API server built with Axum framework.
//!
//! Routes live under `/api` (auth, users, chats, groups, messages) plus the
//! `/health` probes. Responses share one JSON envelope, see [`response`].

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{
    create_app, create_app_state, create_app_state_with, run, run_server, spawn_maintenance,
};
pub use state::AppState;
