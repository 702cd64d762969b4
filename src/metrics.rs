use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// CPU and GPU share the usage/temperature shape; the two families differ
/// only by which log lines feed them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaugeSample {
    pub time: Timestamp,
    pub usage: f64,
    pub temperature: f64,
}

/// One physical-RAM or virtual-memory sample. `used`/`total` are in GB.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySample {
    pub time: Timestamp,
    pub usage_percent: f64,
    pub used: f64,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub fs_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_percent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub name: String,
    pub size: String,
    pub partitions: Vec<Partition>,
}

/// The complete disk/partition tree observed under a single timestamp token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub timestamp: Timestamp,
    pub disks: Vec<Disk>,
}

/// Cumulative byte counters plus the derived per-second rates for one
/// interface sample. `timestamp` is the epoch-ms view of `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSample {
    pub time: Timestamp,
    pub timestamp: i64,
    pub interface: String,
    pub incoming_total: u64,
    pub outgoing_total: u64,
    pub incoming_bps: f64,
    pub outgoing_bps: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeSample {
    pub time: Timestamp,
    pub uptime: String,
    pub users: u32,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartStatus {
    pub status: Option<String>,
}

/// Physical RAM and virtual memory histories, kept separately.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub ram: Vec<MemorySample>,
    #[serde(rename = "virtual")]
    pub virtual_memory: Vec<MemorySample>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
