use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use telemetry_monitor::api::{router, AppState};
use telemetry_monitor::config::Config;
use telemetry_monitor::console;
use telemetry_monitor::runtime;
use telemetry_monitor::session::SamplerSession;
use telemetry_monitor::storage::TelemetryStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    runtime::init_tracing();
    let config = Config::parse();
    info!(
        "Starting: mode={:?}, bind={}, port={}, sampler={}, reports_dir={}, history={}",
        config.mode,
        config.bind,
        config.port,
        config.sampler,
        config.reports_dir.display(),
        config.history
    );

    let store = Arc::new(TelemetryStore::new(config.history));
    let session = Arc::new(SamplerSession::new(
        config.sampler.clone(),
        config.sampler_args.clone(),
        store.clone(),
    ));
    let cancel = CancellationToken::new();

    let console_handle = if config.console_enabled() {
        let console_store = store.clone();
        let console_cancel = cancel.clone();
        let interval = config.refresh_interval();
        Some(tokio::spawn(async move {
            console::run_console(console_store, interval, console_cancel).await;
        }))
    } else {
        None
    };

    let web_handle = if config.web_enabled() {
        let state = AppState {
            store: store.clone(),
            session: session.clone(),
            reports_dir: config.reports_dir.clone(),
            shutdown: cancel.clone(),
        };
        let app = router(state);
        let addr = SocketAddr::from((config.bind, config.port));
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                return;
            }
        };
        info!(
            "HTTP server listening on http://{}",
            listener.local_addr().unwrap_or(addr)
        );
        let shutdown = cancel.clone();
        Some(tokio::spawn(async move {
            let res = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = res {
                error!("Server error: {}", e);
            }
        }))
    } else {
        None
    };

    runtime::shutdown_signal().await;
    cancel.cancel();
    session.stop();

    if let Some(h) = web_handle {
        let _ = h.await;
    }
    if let Some(h) = console_handle {
        let _ = h.await;
    }
}
