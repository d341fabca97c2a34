//! HTTP routes for tracked-event ingestion.

use axum::{routing::post, Router};

use super::handlers::{record_batch, EventHandlers};

/// Creates the event router; mounted under `/api/events`.
pub fn event_routes(handlers: EventHandlers) -> Router {
    Router::new()
        .route("/batch", post(record_batch))
        .with_state(handlers)
}
