use crate::error::{MonitorError, Result};
use crate::storage::TelemetryStore;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

struct RunningSampler {
    child: Child,
    cancel: CancellationToken,
}

/// Owned handle for the external sampler process.
///
/// The sampler is a black box reached only through its stdout line format;
/// this handle spawns it, pipes every line into the [`TelemetryStore`], and
/// reports lifecycle outcomes explicitly instead of keeping a free-floating
/// global process reference. Stopping tears the session down at a line
/// boundary; any open disk snapshot is discarded, and the next start resets
/// all rolling parse state.
pub struct SamplerSession {
    program: String,
    args: Vec<String>,
    store: Arc<TelemetryStore>,
    running: Mutex<Option<RunningSampler>>,
}

impl SamplerSession {
    pub fn new(program: impl Into<String>, args: Vec<String>, store: Arc<TelemetryStore>) -> Self {
        Self {
            program: program.into(),
            args,
            store,
            running: Mutex::new(None),
        }
    }

    pub fn start(&self) -> Result<StartOutcome> {
        let mut guard = self.lock();
        if guard.is_some() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        self.store.reset();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MonitorError::Sampler(format!("spawn {}: {e}", self.program)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MonitorError::Sampler("sampler stdout not captured".into()))?;
        let stderr = child.stderr.take();

        let cancel = CancellationToken::new();

        let store = self.store.clone();
        let reader_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    _ = reader_cancel.cancelled() => break,
                    next = lines.next_line() => match next {
                        Ok(Some(line)) => store.push_line(&line),
                        Ok(None) => {
                            info!("sampler stream ended");
                            break;
                        }
                        Err(e) => {
                            warn!("sampler read error: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        if let Some(stderr) = stderr {
            let stderr_cancel = cancel.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                loop {
                    tokio::select! {
                        _ = stderr_cancel.cancelled() => break,
                        next = lines.next_line() => match next {
                            Ok(Some(line)) => warn!("sampler stderr: {}", line),
                            _ => break,
                        }
                    }
                }
            });
        }

        info!("sampler started: {}", self.program);
        *guard = Some(RunningSampler { child, cancel });
        Ok(StartOutcome::Started)
    }

    pub fn stop(&self) -> StopOutcome {
        let mut guard = self.lock();
        match guard.take() {
            Some(mut running) => {
                running.cancel.cancel();
                if let Err(e) = running.child.start_kill() {
                    // Already exited on its own; the handle is gone either way.
                    warn!("sampler kill: {}", e);
                }
                info!("sampler stopped");
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<RunningSampler>> {
        match self.running.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for SamplerSession {
    fn drop(&mut self) {
        self.stop();
    }
}
