//! HTTP adapter for researcher exports, stats, and the dashboard.

mod handlers;
mod routes;

pub use handlers::ResearchHandlers;
pub use routes::{export_routes, stats_routes};
