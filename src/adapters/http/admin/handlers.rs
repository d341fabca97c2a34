//! HTTP handlers for operator maintenance.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{domain_error_response, json_rejection_response};
use crate::application::handlers::admin::{
    AdminError, DeleteAllDataCommand, DeleteAllDataHandler, RemoveParticipantCommand,
    RemoveParticipantHandler,
};

use super::dto::{
    DeleteAllDataRequest, DeleteAllDataResponse, RemoveParticipantRequest,
    RemoveParticipantResponse,
};

#[derive(Clone)]
pub struct AdminHandlers {
    delete_all_handler: Arc<DeleteAllDataHandler>,
    remove_participant_handler: Arc<RemoveParticipantHandler>,
}

impl AdminHandlers {
    pub fn new(
        delete_all_handler: Arc<DeleteAllDataHandler>,
        remove_participant_handler: Arc<RemoveParticipantHandler>,
    ) -> Self {
        Self {
            delete_all_handler,
            remove_participant_handler,
        }
    }
}

/// POST /api/admin/delete-all-data - Wipe every category
pub async fn delete_all_data(
    State(handlers): State<AdminHandlers>,
    body: Result<Json<DeleteAllDataRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };

    let cmd = DeleteAllDataCommand {
        confirmation: req.confirm.unwrap_or_default(),
    };

    match handlers.delete_all_handler.handle(cmd).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteAllDataResponse {
                success: true,
                message: "All study data deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => handle_admin_error(e),
    }
}

/// POST /api/admin/remove-participant - Erase one participant's records
pub async fn remove_participant(
    State(handlers): State<AdminHandlers>,
    body: Result<Json<RemoveParticipantRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(rejection),
    };

    let cmd = RemoveParticipantCommand {
        session_id: req.session_id,
        prolific_pid: req.prolific_pid,
    };

    match handlers.remove_participant_handler.handle(cmd).await {
        Ok(result) => {
            (StatusCode::OK, Json(RemoveParticipantResponse::from(result))).into_response()
        }
        Err(e) => handle_admin_error(e),
    }
}

fn handle_admin_error(error: AdminError) -> Response {
    domain_error_response(error.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_mismatch_maps_to_400() {
        let response = handle_admin_error(AdminError::ConfirmationMismatch);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_identifier_maps_to_400() {
        let response = handle_admin_error(AdminError::MissingIdentifier);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_participant_maps_to_404() {
        let response = handle_admin_error(AdminError::NotFound("p-9".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
