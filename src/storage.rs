use crate::assemble::LiveAssembler;
use crate::classify::{classify, ClassifiedLine, Gauge, MemoryKind};
use crate::disks::DiskSnapshotBuilder;
use crate::history::History;
use crate::metrics::{
    DiskSnapshot, GaugeSample, MemoryReport, MemorySample, NetworkSample, SmartStatus,
    UptimeSample,
};
use crate::netrate::RateTracker;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;

/// One typed update on the live stream, fanned out to SSE subscribers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum TelemetryEvent {
    Cpu(GaugeSample),
    Gpu(GaugeSample),
    Ram(MemorySample),
    VirtualMemory(MemorySample),
    Disk(DiskSnapshot),
    Network(NetworkSample),
    Uptime(UptimeSample),
    Smart(SmartStatus),
}

/// Everything the live session has assembled so far, as plain data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveView {
    pub cpu: Vec<GaugeSample>,
    pub gpu: Vec<GaugeSample>,
    pub memory: MemoryReport,
    pub disk: Vec<DiskSnapshot>,
    pub network: Vec<NetworkSample>,
    pub uptime: Vec<UptimeSample>,
    pub smart: SmartStatus,
}

/// Rolling state of one live session. Owned exclusively by the store; a new
/// session replaces it wholesale, so nothing leaks across sessions.
#[derive(Debug)]
struct LiveState {
    assembler: LiveAssembler,
    disks: DiskSnapshotBuilder,
    rates: RateTracker,
    snapshots: History<DiskSnapshot>,
    network: History<NetworkSample>,
    uptime: History<UptimeSample>,
    smart: SmartStatus,
}

impl LiveState {
    fn new(capacity: usize) -> Self {
        Self {
            assembler: LiveAssembler::new(capacity),
            disks: DiskSnapshotBuilder::new(),
            rates: RateTracker::new(),
            snapshots: History::bounded(capacity),
            network: History::bounded(capacity),
            uptime: History::bounded(capacity),
            smart: SmartStatus::default(),
        }
    }
}

/// Shared store for the live telemetry stream: the sampler reader task
/// writes one line at a time, HTTP handlers and the console read views,
/// and each applied line is broadcast as a typed event.
pub struct TelemetryStore {
    capacity: usize,
    inner: RwLock<LiveState>,
    events: broadcast::Sender<TelemetryEvent>,
}

impl TelemetryStore {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            capacity,
            inner: RwLock::new(LiveState::new(capacity)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.events.subscribe()
    }

    /// Discards all rolling state, including any open unflushed disk
    /// snapshot. Called when a new sampler session starts.
    pub fn reset(&self) {
        *self.write() = LiveState::new(self.capacity);
    }

    /// Classifies and applies one raw line from the sampler. Lines without a
    /// timestamp prefix are stamped with the current wall clock; unrecognized
    /// lines are dropped silently.
    pub fn push_line(&self, raw: &str) {
        let (token, rest) = Timestamp::split_prefix(raw.trim());
        let Some(line) = classify(rest) else {
            return;
        };
        let time = token.unwrap_or_else(Timestamp::now);

        let event = {
            let mut state = self.write();
            apply_line(&mut state, &time, line)
        };

        if let Some(event) = event {
            // Send fails only when no subscriber is listening.
            let _ = self.events.send(event);
        }
    }

    pub fn view(&self) -> LiveView {
        let state = self.read();
        LiveView {
            cpu: state.assembler.cpu().to_vec(),
            gpu: state.assembler.gpu().to_vec(),
            memory: MemoryReport {
                ram: state.assembler.ram().to_vec(),
                virtual_memory: state.assembler.virtual_memory().to_vec(),
            },
            disk: state.snapshots.to_vec(),
            network: state.network.to_vec(),
            uptime: state.uptime.to_vec(),
            smart: state.smart.clone(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LiveState> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, LiveState> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn apply_line(
    state: &mut LiveState,
    time: &Timestamp,
    line: ClassifiedLine,
) -> Option<TelemetryEvent> {
    match line {
        ClassifiedLine::Disk { .. } | ClassifiedLine::Partition(_) => {
            let closed = state.disks.observe(time, &line)?;
            state.snapshots.push(closed.clone());
            Some(TelemetryEvent::Disk(closed))
        }
        ClassifiedLine::Network {
            interface,
            incoming_total,
            outgoing_total,
        } => {
            let sample =
                state
                    .rates
                    .observe(time.clone(), &interface, incoming_total, outgoing_total)?;
            state.network.push(sample.clone());
            Some(TelemetryEvent::Network(sample))
        }
        ClassifiedLine::Uptime {
            uptime,
            users,
            load_one,
            load_five,
            load_fifteen,
        } => {
            let sample = UptimeSample {
                time: time.clone(),
                uptime,
                users,
                load_one,
                load_five,
                load_fifteen,
            };
            state.uptime.push(sample.clone());
            Some(TelemetryEvent::Uptime(sample))
        }
        ClassifiedLine::Smart(status) => {
            state.smart = SmartStatus {
                status: Some(status),
            };
            Some(TelemetryEvent::Smart(state.smart.clone()))
        }
        _ => {
            if !state.assembler.apply(time, &line) {
                return None;
            }
            // The applied line either appended or completed the last entry of
            // its family; broadcast that entry's current value.
            match &line {
                ClassifiedLine::Usage(gauge, _)
                | ClassifiedLine::Temperature(gauge, _)
                | ClassifiedLine::GaugePair(gauge, _, _) => {
                    let history = match gauge {
                        Gauge::Cpu => state.assembler.cpu(),
                        Gauge::Gpu => state.assembler.gpu(),
                    };
                    let sample = history.last()?.clone();
                    Some(match gauge {
                        Gauge::Cpu => TelemetryEvent::Cpu(sample),
                        Gauge::Gpu => TelemetryEvent::Gpu(sample),
                    })
                }
                ClassifiedLine::MemUtilization(kind, _)
                | ClassifiedLine::MemUsed(kind, _)
                | ClassifiedLine::MemTotal(kind, _)
                | ClassifiedLine::MemTriple(kind, _, _, _) => {
                    let history = match kind {
                        MemoryKind::Ram => state.assembler.ram(),
                        MemoryKind::Virtual => state.assembler.virtual_memory(),
                    };
                    let sample = history.last()?.clone();
                    Some(match kind {
                        MemoryKind::Ram => TelemetryEvent::Ram(sample),
                        MemoryKind::Virtual => TelemetryEvent::VirtualMemory(sample),
                    })
                }
                _ => None,
            }
        }
    }
}
