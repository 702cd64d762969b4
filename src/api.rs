use crate::error::MonitorError;
use crate::metrics::ErrorResponse;
use crate::reports;
use crate::session::{SamplerSession, StartOutcome, StopOutcome};
use crate::storage::TelemetryStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TelemetryStore>,
    pub session: Arc<SamplerSession>,
    pub reports_dir: PathBuf,
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/live", get(get_live))
        .route("/api/stream", get(stream))
        .route("/api/monitor/start", post(start_monitor))
        .route("/api/monitor/stop", post(stop_monitor))
        .route("/api/reports", get(get_report_list))
        .route("/api/reports/:folder", get(get_report))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

async fn get_live(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.store.view())).into_response()
}

async fn start_monitor(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.start() {
        Ok(StartOutcome::Started) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Monitoring started",
            }),
        )
            .into_response(),
        Ok(StartOutcome::AlreadyRunning) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Monitoring already running".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start sampler: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn stop_monitor(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.stop() {
        StopOutcome::Stopped => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Monitoring stopped",
            }),
        )
            .into_response(),
        StopOutcome::NotRunning => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Monitoring is not running".to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_report_list(State(state): State<AppState>) -> impl IntoResponse {
    match reports::list_reports(&state.reports_dir) {
        Ok(folders) => (StatusCode::OK, Json(folders)).into_response(),
        Err(e) => {
            error!("Failed to list reports: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to read reports".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn get_report(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> impl IntoResponse {
    match reports::load_report(&state.reports_dir, &folder) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(MonitorError::InvalidFolderName(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid folder name".to_string(),
            }),
        )
            .into_response(),
        Err(MonitorError::FolderNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Folder not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read logs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to read logs".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.store.subscribe();
    let shutdown = state.shutdown.clone();
    let stream = BroadcastStream::new(rx)
        .take_until(async move { shutdown.cancelled().await })
        .map(|msg| match msg {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Ok(Event::default().data(json)),
                Err(e) => Ok(Event::default()
                    .event("error")
                    .data(format!("serialize_error: {e}"))),
            },
            Err(e) => Ok(Event::default()
                .event("error")
                .data(format!("stream_error: {e}"))),
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(10))
            .text("keep-alive"),
    )
}
