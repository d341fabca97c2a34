//! HTTP adapter for tracked-event ingestion.

mod dto;
mod handlers;
mod routes;

pub use dto::{EventBatchRequest, EventBatchResponse};
pub use handlers::EventHandlers;
pub use routes::event_routes;
