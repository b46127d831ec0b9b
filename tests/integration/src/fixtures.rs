//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique across runs too, since PostgreSQL-backed runs share a database
pub fn unique_suffix() -> String {
    let run = chrono::Utc::now().timestamp_millis() % 1_000_000_000;
    format!("{run}{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// A fresh shortname with the given prefix (prefix plus suffix stays under 32)
pub fn unique_shortname(prefix: &str) -> String {
    format!("{prefix}_{}", unique_suffix())
}

pub const TEST_PASSWORD: &str = "TestPass123";

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("test{suffix}@example.com"),
            password: TEST_PASSWORD.to_string(),
            display_name: format!("Test User {suffix}"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub shortname: Option<String>,
    pub email: Option<String>,
    pub is_verified: bool,
    pub email_confirmed: bool,
    pub is_deleted: bool,
}

/// Any chat view; fields absent for a variant stay `None`
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub is_private: Option<bool>,
    pub shortname: Option<String>,
    pub member_count: Option<i64>,
    pub role: Option<String>,
    pub peer: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub author: UserResponse,
    pub content: String,
    pub edited_at: Option<String>,
}
