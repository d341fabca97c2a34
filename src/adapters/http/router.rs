//! Top-level router: wires every HTTP area onto the application handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderValue, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::export::SessionCsvExporter;
use crate::application::handlers::{
    CompleteSessionHandler, CreateSessionHandler, DeleteAllDataHandler, ExportDataHandler,
    GetDashboardHandler, GetStudyStatsHandler, GiveConsentHandler, MergedSessionsReader,
    RecordEventBatchHandler, RemoveParticipantHandler, ResumeSessionHandler, SaveProgressHandler,
    SaveSnapshotHandler,
};
use crate::application::SessionIndex;
use crate::config::{ExportConfig, ServerConfig, StudyConfig};
use crate::domain::condition::RandomizerError;
use crate::domain::scoring::AnswerKey;
use crate::domain::session::UpcasterRegistry;
use crate::ports::EventLog;

use super::admin::{admin_routes, AdminHandlers};
use super::events::{event_routes, EventHandlers};
use super::middleware::{require_export_key, ExportKeyState};
use super::research::{export_routes, stats_routes, ResearchHandlers};
use super::session::{session_routes, SessionHandlers};

/// Handler state for every HTTP area.
#[derive(Clone)]
pub struct ApiHandlers {
    pub session: SessionHandlers,
    pub events: EventHandlers,
    pub research: ResearchHandlers,
    pub admin: AdminHandlers,
    pub export_key: ExportKeyState,
}

impl ApiHandlers {
    /// Builds every application handler over one log and one session index.
    pub fn build(
        log: Arc<dyn EventLog>,
        index: Arc<SessionIndex>,
        study: &StudyConfig,
        export: &ExportConfig,
        answer_key: AnswerKey,
    ) -> Result<Self, RandomizerError> {
        let create = CreateSessionHandler::new(
            log.clone(),
            index.clone(),
            study.randomizer()?,
            study.completion_rules(),
        )
        .with_abandoned_after(study.abandoned_after_minutes);

        let session = SessionHandlers::new(
            Arc::new(create),
            Arc::new(GiveConsentHandler::new(log.clone(), index.clone())),
            Arc::new(SaveProgressHandler::new(log.clone(), index.clone())),
            Arc::new(SaveSnapshotHandler::new(log.clone(), index.clone())),
            Arc::new(CompleteSessionHandler::new(log.clone(), index.clone())),
            Arc::new(ResumeSessionHandler::new(index.clone())),
        );

        let events = EventHandlers::new(Arc::new(RecordEventBatchHandler::new(log.clone())));

        let settings = Arc::new(study.analysis_settings(answer_key));
        let reader = MergedSessionsReader::new(log.clone(), Arc::new(UpcasterRegistry::standard()));
        let research = ResearchHandlers::new(
            Arc::new(ExportDataHandler::new(reader.clone(), settings.clone())),
            Arc::new(GetStudyStatsHandler::new(reader.clone(), settings.clone())),
            Arc::new(GetDashboardHandler::new(reader, settings)),
            Arc::new(SessionCsvExporter::new(study.page_order.clone())),
        );

        let admin = AdminHandlers::new(
            Arc::new(DeleteAllDataHandler::new(
                log.clone(),
                index.clone(),
                export.delete_confirmation.clone(),
            )),
            Arc::new(RemoveParticipantHandler::new(log, index)),
        );

        Ok(Self {
            session,
            events,
            research,
            admin,
            export_key: Arc::new(export.key.clone()),
        })
    }
}

/// All API routes plus `/health`, without transport middleware.
pub fn api_router(handlers: ApiHandlers) -> Router {
    let key = handlers.export_key;

    Router::new()
        .route("/health", get(health))
        .nest("/api/session", session_routes(handlers.session))
        .nest("/api/events", event_routes(handlers.events))
        .nest(
            "/api/export",
            export_routes(handlers.research.clone())
                .layer(middleware::from_fn_with_state(key.clone(), require_export_key)),
        )
        .nest(
            "/api",
            stats_routes(handlers.research)
                .layer(middleware::from_fn_with_state(key.clone(), require_export_key)),
        )
        .nest(
            "/api/admin",
            admin_routes(handlers.admin)
                .layer(middleware::from_fn_with_state(key, require_export_key)),
        )
}

/// Request tracing, CORS, and the request timeout.
pub fn with_transport_layers(router: Router, server: &ServerConfig) -> Router {
    router
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

/// Configured origins, or any origin when none are configured.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// GET /health - Liveness check
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
