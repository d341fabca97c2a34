//! HTTP routes for researcher exports and aggregate views.
//!
//! Both routers expect the export-key middleware to be layered on top.

use axum::{routing::get, Router};

use super::handlers::{
    export_all_json, export_csv, export_sessions, export_table, get_dashboard, get_stats,
    ResearchHandlers,
};

/// Export downloads; mounted under `/api/export`.
pub fn export_routes(handlers: ResearchHandlers) -> Router {
    Router::new()
        .route("/sessions", get(export_sessions))
        .route("/all-json", get(export_all_json))
        .route("/csv", get(export_csv))
        .route("/:table", get(export_table))
        .with_state(handlers)
}

/// Aggregate views; mounted under `/api`.
pub fn stats_routes(handlers: ResearchHandlers) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/dashboard", get(get_dashboard))
        .with_state(handlers)
}
