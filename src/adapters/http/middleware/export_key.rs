//! Shared-secret gate for researcher endpoints.
//!
//! Exports, stats, and maintenance calls carry the secret as a `key` query
//! parameter:
//!
//! ```text
//! GET /api/export/csv?key=<secret>
//! ```
//!
//! A missing or wrong key is rejected with 403 before any handler runs, so
//! nothing is read or written for it.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/stats", get(handler))
//!     .layer(middleware::from_fn_with_state(key, require_export_key));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::adapters::http::error::ErrorResponse;

/// Middleware state - the configured export secret.
pub type ExportKeyState = Arc<SecretString>;

#[derive(Debug, Deserialize)]
struct KeyParam {
    key: Option<String>,
}

pub async fn require_export_key(
    State(expected): State<ExportKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = Query::<KeyParam>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(param)| param.key);

    match provided {
        Some(key) if keys_match(&key, expected.expose_secret()) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected export key");
            forbidden()
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Missing export key");
            forbidden()
        }
    }
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::forbidden("Invalid or missing export key")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let key: ExportKeyState = Arc::new(SecretString::new("s3cret".to_string()));
        Router::new()
            .route("/data", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(key, require_export_key))
    }

    async fn status_for(uri: &str) -> StatusCode {
        app()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn matching_key_passes_through() {
        assert_eq!(status_for("/data?key=s3cret").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_or_missing_key_is_forbidden() {
        assert_eq!(status_for("/data?key=nope").await, StatusCode::FORBIDDEN);
        assert_eq!(status_for("/data?key=").await, StatusCode::FORBIDDEN);
        assert_eq!(status_for("/data").await, StatusCode::FORBIDDEN);
    }

    #[test]
    fn key_comparison_is_exact() {
        assert!(keys_match("abc", "abc"));
        assert!(!keys_match("abc", "abcd"));
        assert!(!keys_match("ABC", "abc"));
    }
}
