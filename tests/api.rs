use std::path::PathBuf;
use std::sync::Arc;
use telemetry_monitor::api::{router, AppState};
use telemetry_monitor::session::SamplerSession;
use telemetry_monitor::storage::TelemetryStore;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

fn test_state(reports_dir: PathBuf) -> AppState {
    let store = Arc::new(TelemetryStore::new(10));
    let session = Arc::new(SamplerSession::new("/bin/true", vec![], store.clone()));
    AppState {
        store,
        session,
        reports_dir,
        shutdown: CancellationToken::new(),
    }
}

async fn get(app: axum::Router, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post(app: axum::Router, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_ok() {
    let app = router(test_state(PathBuf::from("system_reports")));
    let (status, json) = get(app, "/api/health").await;
    assert_eq!(status, 200);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn live_view_starts_empty() {
    let app = router(test_state(PathBuf::from("system_reports")));
    let (status, json) = get(app, "/api/live").await;
    assert_eq!(status, 200);
    assert_eq!(json["cpu"].as_array().unwrap().len(), 0);
    assert_eq!(json["memory"]["ram"].as_array().unwrap().len(), 0);
    assert!(json["smart"]["status"].is_null());
}

#[tokio::test]
async fn live_view_reflects_pushed_lines() {
    let state = test_state(PathBuf::from("system_reports"));
    state.store.push_line("CPU Usage: 42.5%");
    state.store.push_line("CPU Temperature: 55.0°C");
    let app = router(state);

    let (status, json) = get(app, "/api/live").await;
    assert_eq!(status, 200);
    let cpu = json["cpu"].as_array().unwrap();
    assert_eq!(cpu.len(), 1);
    assert_eq!(cpu[0]["usage"], 42.5);
    assert_eq!(cpu[0]["temperature"], 55.0);
}

#[tokio::test]
async fn stop_without_start_is_bad_request() {
    let app = router(test_state(PathBuf::from("system_reports")));
    let (status, json) = post(app, "/api/monitor/stop").await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Monitoring is not running");
}

#[tokio::test]
async fn report_folder_name_is_validated() {
    let tmp = tempfile::tempdir().unwrap();
    let app = router(test_state(tmp.path().to_path_buf()));
    let (status, json) = get(app, "/api/reports/not-a-token").await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Invalid folder name");
}

#[tokio::test]
async fn missing_report_folder_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let app = router(test_state(tmp.path().to_path_buf()));
    let (status, json) = get(app, "/api/reports/2024-03-01-12h-00min-00sec").await;
    assert_eq!(status, 404);
    assert_eq!(json["error"], "Folder not found");
}

#[tokio::test]
async fn report_folder_is_parsed_by_file_name() {
    let tmp = tempfile::tempdir().unwrap();
    let folder = tmp.path().join("2024-03-01-12h-00min-00sec");
    std::fs::create_dir(&folder).unwrap();
    std::fs::write(
        folder.join("cpu.log"),
        "2024-03-01-12h-00min-00sec: CPU Usage: 42.5% CPU Temperature: 55.0°C\n",
    )
    .unwrap();
    std::fs::write(
        folder.join("network.log"),
        "2024-03-01-12h-00min-00sec: Network Traffic: Interface: eth0 | Incoming_Bytes_Total: 500 | Outgoing_Bytes_Total: 0\n\
         2024-03-01-12h-00min-01sec: Network Traffic: Interface: eth0 | Incoming_Bytes_Total: 1500 | Outgoing_Bytes_Total: 0\n",
    )
    .unwrap();

    let app = router(test_state(tmp.path().to_path_buf()));
    let (status, json) = get(app, "/api/reports/2024-03-01-12h-00min-00sec").await;
    assert_eq!(status, 200);
    assert_eq!(json["folder"], "2024-03-01-12h-00min-00sec");
    assert_eq!(json["cpu"][0]["usage"], 42.5);
    assert_eq!(json["network"][1]["incomingBps"], 1000.0);
    assert_eq!(json["gpu"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn report_listing_shows_token_folders() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("2024-03-01-12h-00min-00sec")).unwrap();
    std::fs::create_dir(tmp.path().join("junk")).unwrap();

    let app = router(test_state(tmp.path().to_path_buf()));
    let (status, json) = get(app, "/api/reports").await;
    assert_eq!(status, 200);
    assert_eq!(
        json.as_array().unwrap(),
        &vec![serde_json::json!("2024-03-01-12h-00min-00sec")]
    );
}

#[tokio::test]
async fn stream_is_event_stream() {
    let app = router(test_state(PathBuf::from("system_reports")));
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/api/stream")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(ct.starts_with("text/event-stream"));
}
