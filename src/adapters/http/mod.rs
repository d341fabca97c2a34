//! HTTP adapters - REST API implementations.
//!
//! Each area has its own dto/handlers/routes; `router` mounts them:
//!
//! - `session` - participant lifecycle (`/api/session/*`)
//! - `events` - tracked-event batches (`/api/events/*`)
//! - `research` - exports, stats, dashboard (export key required)
//! - `admin` - maintenance (export key required)

pub mod admin;
pub mod error;
pub mod events;
pub mod middleware;
pub mod research;
mod router;
pub mod session;

pub use error::ErrorResponse;
pub use router::{api_router, with_transport_layers, ApiHandlers};
