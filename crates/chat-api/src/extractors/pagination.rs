//! Pagination extractor
//!
//! Reads the `before` cursor and `limit` of a message page from the query
//! string. The limit is clamped later by [`MessagePage::limit`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chat_service::MessagePage;

use crate::response::ApiError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination(pub MessagePage);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(page) = Query::<MessagePage>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Pagination(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chat_core::Snowflake;

    async fn extract(uri: &str) -> Result<Pagination, ApiError> {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        Pagination::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_defaults_without_query() {
        let Pagination(page) = extract("/api/messages/chat/1").await.unwrap();
        assert!(page.before.is_none());
        assert_eq!(page.limit(), 50);
    }

    #[tokio::test]
    async fn test_cursor_and_limit() {
        let Pagination(page) = extract("/api/messages/chat/1?before=123456789&limit=500")
            .await
            .unwrap();
        assert_eq!(page.before, Some(Snowflake::new(123_456_789)));
        assert_eq!(page.limit(), 100);
    }

    #[tokio::test]
    async fn test_bad_cursor_is_rejected() {
        let err = extract("/api/messages/chat/1?before=abc").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }
}
