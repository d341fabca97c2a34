//! HTTP handlers for the participant-facing session endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{
    bad_request, domain_error_response, json_rejection_response, require_session_id,
};
use crate::application::handlers::session::{
    CompleteSessionCommand, CompleteSessionHandler, CreateSessionCommand, CreateSessionHandler,
    GiveConsentCommand, GiveConsentHandler, ResumeOutcome, ResumeSessionHandler,
    ResumeSessionQuery, SaveProgressCommand, SaveProgressHandler, SaveSnapshotCommand,
    SaveSnapshotHandler,
};
use crate::domain::session::SessionError;

use super::dto::{
    AckResponse, ConsentRequest, CreateSessionRequest, CreateSessionResponse, ResumeParams,
    ResumeResponse, SaveProgressRequest, SessionSummaryRequest, SnapshotResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    create_handler: Arc<CreateSessionHandler>,
    consent_handler: Arc<GiveConsentHandler>,
    progress_handler: Arc<SaveProgressHandler>,
    snapshot_handler: Arc<SaveSnapshotHandler>,
    complete_handler: Arc<CompleteSessionHandler>,
    resume_handler: Arc<ResumeSessionHandler>,
}

impl SessionHandlers {
    pub fn new(
        create_handler: Arc<CreateSessionHandler>,
        consent_handler: Arc<GiveConsentHandler>,
        progress_handler: Arc<SaveProgressHandler>,
        snapshot_handler: Arc<SaveSnapshotHandler>,
        complete_handler: Arc<CompleteSessionHandler>,
        resume_handler: Arc<ResumeSessionHandler>,
    ) -> Self {
        Self {
            create_handler,
            consent_handler,
            progress_handler,
            snapshot_handler,
            complete_handler,
            resume_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/session/create - Start (or return) a participant's session
pub async fn create_session(
    State(handlers): State<SessionHandlers>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };

    let cmd = CreateSessionCommand {
        prolific_pid: req.prolific_pid.clone(),
        study_id: req.study_id.clone(),
        requested_condition: req.condition.clone(),
        device_info: req.device_metadata(),
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(result) => {
            let status = if result.resumed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(CreateSessionResponse::from(result))).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/session/consent - Record informed consent
pub async fn give_consent(
    State(handlers): State<SessionHandlers>,
    body: Result<Json<ConsentRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let session_id = match require_session_id(req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .consent_handler
        .handle(GiveConsentCommand { session_id })
        .await
    {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/session/progress - Checkpoint the current page and form data
pub async fn save_progress(
    State(handlers): State<SessionHandlers>,
    body: Result<Json<SaveProgressRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let session_id = match require_session_id(req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(page_index) = req.current_page_index else {
        return bad_request("currentPageIndex is required");
    };

    let cmd = SaveProgressCommand {
        session_id,
        page_index,
        page_id: req.current_page_id,
        form_data: req.form_data,
    };

    match handlers.progress_handler.handle(cmd).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/session/resume?pid=&sid= - Where a returning participant left off
pub async fn resume_session(
    State(handlers): State<SessionHandlers>,
    Query(params): Query<ResumeParams>,
) -> Response {
    let query = ResumeSessionQuery {
        prolific_pid: params.pid,
        session_id: params.sid,
    };

    let response = match handlers.resume_handler.handle(query).await {
        ResumeOutcome::NotFound => ResumeResponse::not_found(),
        ResumeOutcome::AlreadyComplete(state) | ResumeOutcome::Resumable(state) => {
            ResumeResponse::found(state)
        }
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/session/snapshot - Store a running behavioural summary
pub async fn save_snapshot(
    State(handlers): State<SessionHandlers>,
    body: Result<Json<SessionSummaryRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let session_id = match require_session_id(req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SaveSnapshotCommand {
        session_id,
        summary: req.summary,
    };

    match handlers.snapshot_handler.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SnapshotResponse {
                success: true,
                applied: result.applied,
            }),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/session/complete - Store the final summary and close the session
pub async fn complete_session(
    State(handlers): State<SessionHandlers>,
    body: Result<Json<SessionSummaryRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let session_id = match require_session_id(req.session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = CompleteSessionCommand {
        session_id,
        summary: req.summary,
    };

    match handlers.complete_handler.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            Json(AckResponse {
                success: true,
                completed_at: Some(result.completed_at.to_rfc3339()),
            }),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_session_error(error: SessionError) -> Response {
    domain_error_response(error.into())
}
