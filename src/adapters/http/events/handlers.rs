//! HTTP handlers for tracked-event ingestion.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::adapters::http::error::{
    bad_request, domain_error_response, json_rejection_response, require_session_id,
};
use crate::application::handlers::events::{RecordEventBatchCommand, RecordEventBatchHandler};

use super::dto::{EventBatchRequest, EventBatchResponse};

#[derive(Clone)]
pub struct EventHandlers {
    batch_handler: Arc<RecordEventBatchHandler>,
}

impl EventHandlers {
    pub fn new(batch_handler: Arc<RecordEventBatchHandler>) -> Self {
        Self { batch_handler }
    }
}

/// POST /api/events/batch - Route a client batch to the category logs
pub async fn record_batch(
    State(handlers): State<EventHandlers>,
    body: Result<Json<EventBatchRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let session_id = match require_session_id(req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let events = match req.events {
        Some(Value::Array(events)) => events,
        _ => return bad_request("events must be an array"),
    };

    let cmd = RecordEventBatchCommand { session_id, events };

    match handlers.batch_handler.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(EventBatchResponse::from(result))).into_response(),
        Err(e) => domain_error_response(e.into()),
    }
}
