//! Error responses shared by every HTTP area.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "FORBIDDEN".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Maps a domain error to its status code and body.
pub fn domain_error_response(error: DomainError) -> Response {
    let (status, body) = match error.code {
        ErrorCode::ValidationFailed
        | ErrorCode::MalformedRequest
        | ErrorCode::ConfirmationMismatch => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::bad_request(error.message.clone()),
        ),
        ErrorCode::Forbidden => (
            StatusCode::FORBIDDEN,
            ErrorResponse::forbidden(error.message.clone()),
        ),
        ErrorCode::SessionNotFound | ErrorCode::NotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse {
                code: "NOT_FOUND".to_string(),
                message: error.message.clone(),
                details: None,
            },
        ),
        ErrorCode::SessionAlreadyComplete => (
            StatusCode::CONFLICT,
            ErrorResponse::conflict(error.code, error.message.clone()),
        ),
        ErrorCode::StorageError | ErrorCode::InternalError => {
            tracing::error!(code = %error.code, error = %error.message, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::internal(error.message.clone()),
            )
        }
    };

    let body = if error.details.is_empty() {
        body
    } else {
        let details: serde_json::Map<String, serde_json::Value> = error
            .details
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        body.with_details(serde_json::Value::Object(details))
    };

    (status, Json(body)).into_response()
}

/// 400 for a body that is not the expected JSON shape.
pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    bad_request(rejection.body_text())
}

/// Reads the correlation id every participant-facing body must carry.
pub fn require_session_id(raw: Option<String>) -> Result<SessionId, Response> {
    let raw = raw.ok_or_else(|| bad_request("session_id is required"))?;
    SessionId::new(raw.trim()).map_err(|e| bad_request(e.to_string()))
}

pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(message)),
    )
        .into_response()
}
