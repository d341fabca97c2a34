//! HTTP handlers for researcher exports and aggregate views.
//!
//! Every response is recomputed from the event log on request; nothing here
//! reads the session cache.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::export::SessionCsvExporter;
use crate::adapters::http::error::domain_error_response;
use crate::application::handlers::analytics::{
    AnalyticsError, ExportDataHandler, GetDashboardHandler, GetStudyStatsHandler,
};

/// File name offered for the CSV download.
const CSV_FILE_NAME: &str = "permit_study_sessions.csv";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ResearchHandlers {
    export_handler: Arc<ExportDataHandler>,
    stats_handler: Arc<GetStudyStatsHandler>,
    dashboard_handler: Arc<GetDashboardHandler>,
    csv_exporter: Arc<SessionCsvExporter>,
}

impl ResearchHandlers {
    pub fn new(
        export_handler: Arc<ExportDataHandler>,
        stats_handler: Arc<GetStudyStatsHandler>,
        dashboard_handler: Arc<GetDashboardHandler>,
        csv_exporter: Arc<SessionCsvExporter>,
    ) -> Self {
        Self {
            export_handler,
            stats_handler,
            dashboard_handler,
            csv_exporter,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Exports
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/export/sessions - Merged sessions with derived fields
pub async fn export_sessions(State(handlers): State<ResearchHandlers>) -> Response {
    match handlers.export_handler.sessions().await {
        Ok(sessions) => (StatusCode::OK, Json(sessions)).into_response(),
        Err(e) => handle_analytics_error(e),
    }
}

/// GET /api/export/all-json - Sessions plus every raw category
pub async fn export_all_json(State(handlers): State<ResearchHandlers>) -> Response {
    match handlers.export_handler.all_json().await {
        Ok(everything) => (StatusCode::OK, Json(everything)).into_response(),
        Err(e) => handle_analytics_error(e),
    }
}

/// GET /api/export/csv - One row per session
pub async fn export_csv(State(handlers): State<ResearchHandlers>) -> Response {
    match handlers.export_handler.analyzed().await {
        Ok(sessions) => {
            let body = handlers.csv_exporter.render(&sessions);
            tracing::info!(rows = sessions.len(), "CSV export rendered");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => handle_analytics_error(e),
    }
}

/// GET /api/export/:table - Raw records of one category
pub async fn export_table(
    State(handlers): State<ResearchHandlers>,
    Path(table): Path<String>,
) -> Response {
    match handlers.export_handler.table(&table).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => handle_analytics_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Aggregates
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/stats - Study-wide aggregate
pub async fn get_stats(State(handlers): State<ResearchHandlers>) -> Response {
    match handlers.stats_handler.handle().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => handle_analytics_error(e),
    }
}

/// GET /api/dashboard - Aggregate plus per-session roster
pub async fn get_dashboard(State(handlers): State<ResearchHandlers>) -> Response {
    match handlers.dashboard_handler.handle().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => handle_analytics_error(e),
    }
}

fn handle_analytics_error(error: AnalyticsError) -> Response {
    domain_error_response(error.into())
}
