//! HTTP routes for the session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_session, create_session, give_consent, resume_session, save_progress,
    save_snapshot, SessionHandlers,
};

/// Creates the session router; mounted under `/api/session`.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/create", post(create_session))
        .route("/consent", post(give_consent))
        .route("/progress", post(save_progress))
        .route("/resume", get(resume_session))
        .route("/snapshot", post(save_snapshot))
        .route("/complete", post(complete_session))
        .with_state(handlers)
}
