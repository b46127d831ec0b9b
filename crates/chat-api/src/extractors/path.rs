//! Path parameter extractors
//!
//! Route parameters are parsed here so a malformed id is reported in the
//! error envelope instead of axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chat_core::Snowflake;
use serde::de::DeserializeOwned;

use crate::response::ApiError;

async fn single_param<S, T>(parts: &mut Parts, state: &S) -> Result<T, ApiError>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    let Path(inner) = Path::<T>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::invalid_path(e.body_text()))?;
    Ok(inner)
}

/// A single Snowflake id (`:user_id`, `:chat_id`, `:group_id`, `:message_id`)
#[derive(Debug, Clone, Copy)]
pub struct SnowflakePath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for SnowflakePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        single_param(parts, state).await.map(SnowflakePath)
    }
}

/// A `:shortname` segment
#[derive(Debug, Clone)]
pub struct ShortnamePath(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ShortnamePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        single_param::<S, String>(parts, state)
            .await
            .map(|shortname| ShortnamePath(shortname.trim().to_string()))
    }
}
