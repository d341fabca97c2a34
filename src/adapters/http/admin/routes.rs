//! HTTP routes for operator maintenance.

use axum::{routing::post, Router};

use super::handlers::{delete_all_data, remove_participant, AdminHandlers};

/// Maintenance router; mounted under `/api/admin` behind the export key.
pub fn admin_routes(handlers: AdminHandlers) -> Router {
    Router::new()
        .route("/delete-all-data", post(delete_all_data))
        .route("/remove-participant", post(remove_participant))
        .with_state(handlers)
}
