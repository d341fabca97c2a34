//! Integration tests for the file-backed event log across restarts.
//!
//! A "restart" is a fresh `JsonlEventLog` + `SessionIndex` over the same
//! directory, exactly what `main` does at startup.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use permit_study::adapters::http::{api_router, ApiHandlers};
use permit_study::adapters::JsonlEventLog;
use permit_study::application::SessionIndex;
use permit_study::config::{ExportConfig, StudyConfig};
use permit_study::domain::scoring::permit_answer_key;
use permit_study::domain::session::UpcasterRegistry;
use permit_study::ports::EventLog;

async fn start(dir: &TempDir) -> (Router, Arc<SessionIndex>) {
    let log: Arc<dyn EventLog> = Arc::new(JsonlEventLog::new(dir.path()));
    let index = Arc::new(SessionIndex::new());
    index
        .load(log.as_ref(), &UpcasterRegistry::standard())
        .await
        .unwrap();

    let export = ExportConfig {
        key: SecretString::new("persist-key".to_string()),
        delete_confirmation: "DELETE ALL DATA".to_string(),
    };
    let handlers = ApiHandlers::build(
        log,
        index.clone(),
        &StudyConfig::default(),
        &export,
        permit_answer_key(),
    )
    .unwrap();
    (api_router(handlers), index)
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn sessions_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    let (router, _) = start(&dir).await;
    let (status, created) = call(
        &router,
        "POST",
        "/api/session/create",
        Some(json!({"prolific_pid": "p-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sid = created["session_id"].as_str().unwrap().to_string();
    call(
        &router,
        "POST",
        "/api/session/progress",
        Some(json!({"session_id": sid, "currentPageIndex": 3, "formData": {"a": "x"}})),
    )
    .await;
    drop(router);

    let (router, index) = start(&dir).await;
    assert_eq!(index.len().await, 1);

    let (status, resumed) = call(&router, "GET", "/api/session/resume?pid=p-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["session_id"], sid.as_str());
    assert_eq!(resumed["currentPageIndex"], 3);
    assert_eq!(resumed["formData"], json!({"a": "x"}));
    assert_eq!(resumed["condition"], created["condition"]);
}

#[tokio::test]
async fn corrupt_and_legacy_lines_do_not_block_startup() {
    let dir = TempDir::new().unwrap();
    let lines = [
        r#"{"session_id":"legacy","condition":"B","consent":true,"PROLIFIC_PID":"p-old"}"#,
        r#"{"session_id":"broken","#,
        r#"{"session_id":"fresh","_schema":2,"condition_code":"A","consent_given":false}"#,
    ];
    std::fs::write(dir.path().join("sessions.jsonl"), lines.join("\n") + "\n").unwrap();

    let (router, index) = start(&dir).await;
    assert_eq!(index.len().await, 2);

    let (_, legacy) = call(&router, "GET", "/api/session/resume?pid=p-old", None).await;
    assert_eq!(legacy["session_id"], "legacy");
    assert_eq!(legacy["condition"], "B");
    assert_eq!(legacy["consent_given"], true);

    let (status, sessions) = call(
        &router,
        "GET",
        "/api/export/sessions?key=persist-key",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_utf8_line_does_not_block_startup() {
    let dir = TempDir::new().unwrap();
    let mut content = Vec::new();
    content.extend_from_slice(br#"{"session_id":"s-a","_schema":2,"condition_code":"A","prolific_pid":"p-a"}"#);
    content.extend_from_slice(b"\n\xff\xfe\n");
    content.extend_from_slice(br#"{"session_id":"s-b","_schema":2,"condition_code":"B"}"#);
    content.push(b'\n');
    std::fs::write(dir.path().join("sessions.jsonl"), content).unwrap();

    let (router, index) = start(&dir).await;
    assert_eq!(index.len().await, 2);

    let (status, resumed) = call(&router, "GET", "/api/session/resume?pid=p-a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["session_id"], "s-a");

    let (status, stats) = call(&router, "GET", "/api/stats?key=persist-key", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalSessions"], 2);
}
