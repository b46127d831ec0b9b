//! Test helpers for integration tests
//!
//! Spawns a real server on a local port and talks to it over HTTP. Servers
//! run on the in-memory store by default; [`TestServer::start_postgres`]
//! needs `DATABASE_URL`.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chat_api::{create_app, create_app_state_with};
use chat_common::AppConfig;
use chat_core::{EmailSender, RepoResult, UnitOfWorkFactory};
use chat_db::{
    create_pool, run_migrations, MemoryStore, MemoryUnitOfWorkFactory, PgUnitOfWorkFactory,
    PoolConfig,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{LoginRequest, RegisterRequest, SessionResponse, UserResponse};

/// Counter for unique test ports
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19000);

pub fn get_test_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Keeps every confirmation link the server sends
#[derive(Debug, Default)]
pub struct Mailbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Mailbox {
    /// Token from the last link sent to `email`
    pub fn confirmation_token(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .and_then(|(_, link)| link.split("token=").nth(1))
            .map(str::to_string)
    }
}

#[async_trait]
impl EmailSender for Mailbox {
    async fn send_confirmation(&self, email: &str, _display_name: &str, link: &str) -> RepoResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((email.to_string(), link.to_string()));
        }
        Ok(())
    }
}

/// Success envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Failure envelope
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub details: Option<serde_json::Value>,
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub mailbox: Arc<Mailbox>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on a fresh in-memory store
    pub async fn start() -> Result<Self> {
        let factory = Arc::new(MemoryUnitOfWorkFactory::new(MemoryStore::new()));
        Self::start_with(test_config(), factory).await
    }

    /// Start a server on PostgreSQL, or `None` when `DATABASE_URL` is unset
    pub async fn start_postgres() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let pool = create_pool(&PoolConfig::new(url)).await?;
        let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        run_migrations(&pool, &migrations).await?;

        let server = Self::start_with(test_config(), Arc::new(PgUnitOfWorkFactory::new(pool))).await?;
        Ok(Some(server))
    }

    pub async fn start_with(config: AppConfig, factory: Arc<dyn UnitOfWorkFactory>) -> Result<Self> {
        let mailbox = Arc::new(Mailbox::default());
        let state = create_app_state_with(config, factory, mailbox.clone())?;
        let app = create_app(state)?;

        let addr = SocketAddr::from(([127, 0, 0, 1], get_test_port()));
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            addr: actual_addr,
            client,
            mailbox,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authed(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let request = Self::authed(self.client.get(self.url(path)), token);
        Ok(request.send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, token: Option<&str>, body: &T) -> Result<Response> {
        let request = Self::authed(self.client.post(self.url(path)), token);
        Ok(request.json(body).send().await?)
    }

    /// POST without a body
    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let request = Self::authed(self.client.post(self.url(path)), token);
        Ok(request.send().await?)
    }

    pub async fn put<T: Serialize>(&self, path: &str, token: Option<&str>, body: &T) -> Result<Response> {
        let request = Self::authed(self.client.put(self.url(path)), token);
        Ok(request.json(body).send().await?)
    }

    pub async fn patch<T: Serialize>(&self, path: &str, token: Option<&str>, body: &T) -> Result<Response> {
        let request = Self::authed(self.client.patch(self.url(path)), token);
        Ok(request.json(body).send().await?)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let request = Self::authed(self.client.delete(self.url(path)), token);
        Ok(request.send().await?)
    }

    /// Register and confirm an account, then log in
    pub async fn confirmed_user(&self) -> Result<(RegisterRequest, SessionResponse)> {
        let request = RegisterRequest::unique();
        let response = self.post("/api/auth/register", None, &request).await?;
        let _: UserResponse = assert_data(response, StatusCode::CREATED).await?;

        let token = self
            .mailbox
            .confirmation_token(&request.email)
            .context("no confirmation email sent")?;
        let response = self
            .post("/api/auth/confirm-email", None, &serde_json::json!({ "token": token }))
            .await?;
        let _: UserResponse = assert_data(response, StatusCode::OK).await?;

        let response = self
            .post("/api/auth/login", None, &LoginRequest::from_register(&request))
            .await?;
        let session = assert_data(response, StatusCode::OK).await?;
        Ok((request, session))
    }

    /// A confirmed user who completed their account under `shortname`
    pub async fn verified_user(&self, shortname: &str) -> Result<(SessionResponse, UserResponse)> {
        let (_, session) = self.confirmed_user().await?;
        let response = self
            .post(
                "/api/users/me/complete",
                Some(&session.access_token),
                &serde_json::json!({ "shortname": shortname }),
            )
            .await?;
        let user = assert_data(response, StatusCode::OK).await?;
        Ok((session, user))
    }
}

/// Development defaults with a fixed secret
pub fn test_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::in_memory("integration-test-secret")
}

/// Assert the status and unwrap `data` from the success envelope
pub async fn assert_data<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    anyhow::ensure!(envelope.success, "success flag not set: {body}");
    envelope.data.context("envelope has no data")
}

/// Assert the status and return the failure envelope
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<ErrorEnvelope> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }

    let envelope: ErrorEnvelope = serde_json::from_str(&body)?;
    anyhow::ensure!(!envelope.success, "success flag set on an error: {body}");
    Ok(envelope)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
