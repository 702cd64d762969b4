//! Replays the shared grammar over a complete persisted log file.
//!
//! Each parser walks the file line by line, requires the leading timestamp
//! token, and feeds the same state machines the live path uses. Unlike a live
//! session, a file has a defined end, so the disk parser force-closes the
//! final open snapshot. Unknown line forms are skipped, never fatal.

use crate::assemble::LiveAssembler;
use crate::classify::{classify, ClassifiedLine};
use crate::disks::DiskSnapshotBuilder;
use crate::metrics::{DiskSnapshot, GaugeSample, MemoryReport, NetworkSample, SmartStatus, UptimeSample};
use crate::netrate::RateTracker;
use crate::timestamp::Timestamp;

/// The seven log files a report folder may contain. Batch parsing is
/// selected by file name, not by content sniffing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFile {
    Cpu,
    Gpu,
    Memory,
    Disk,
    Network,
    Smart,
    Load,
}

impl LogFile {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "cpu.log" => Some(Self::Cpu),
            "gpu.log" => Some(Self::Gpu),
            "memory.log" => Some(Self::Memory),
            "disk.log" => Some(Self::Disk),
            "network.log" => Some(Self::Network),
            "smart.log" => Some(Self::Smart),
            "load.log" => Some(Self::Load),
            _ => None,
        }
    }
}

/// Timestamped classified lines of a file, in order. Lines without a token
/// and lines the grammar does not know are skipped.
fn classified_lines(content: &str) -> impl Iterator<Item = (Timestamp, ClassifiedLine)> + '_ {
    content.lines().filter_map(|line| {
        let (time, rest) = Timestamp::split_prefix(line.trim());
        Some((time?, classify(rest)?))
    })
}

fn parse_gauge_log(content: &str) -> LiveAssembler {
    let mut assembler = LiveAssembler::unbounded();
    for (time, line) in classified_lines(content) {
        assembler.apply(&time, &line);
    }
    assembler
}

pub fn parse_cpu_log(content: &str) -> Vec<GaugeSample> {
    parse_gauge_log(content).cpu().to_vec()
}

pub fn parse_gpu_log(content: &str) -> Vec<GaugeSample> {
    parse_gauge_log(content).gpu().to_vec()
}

pub fn parse_memory_log(content: &str) -> MemoryReport {
    let assembler = parse_gauge_log(content);
    MemoryReport {
        ram: assembler.ram().to_vec(),
        virtual_memory: assembler.virtual_memory().to_vec(),
    }
}

pub fn parse_disk_log(content: &str) -> Vec<DiskSnapshot> {
    let mut builder = DiskSnapshotBuilder::new();
    let mut snapshots = Vec::new();
    for (time, line) in classified_lines(content) {
        if let Some(closed) = builder.observe(&time, &line) {
            snapshots.push(closed);
        }
    }
    // The file is complete: the tail snapshot is never left unflushed.
    if let Some(tail) = builder.finish() {
        snapshots.push(tail);
    }
    snapshots
}

pub fn parse_network_log(content: &str) -> Vec<NetworkSample> {
    let mut tracker = RateTracker::new();
    let mut samples = Vec::new();
    for (time, line) in classified_lines(content) {
        if let ClassifiedLine::Network {
            interface,
            incoming_total,
            outgoing_total,
        } = line
        {
            if let Some(sample) = tracker.observe(time, &interface, incoming_total, outgoing_total)
            {
                samples.push(sample);
            }
        }
    }
    samples
}

pub fn parse_uptime_log(content: &str) -> Vec<UptimeSample> {
    classified_lines(content)
        .filter_map(|(time, line)| match line {
            ClassifiedLine::Uptime {
                uptime,
                users,
                load_one,
                load_five,
                load_fifteen,
            } => Some(UptimeSample {
                time,
                uptime,
                users,
                load_one,
                load_five,
                load_fifteen,
            }),
            _ => None,
        })
        .collect()
}

/// The SMART log is a status report, not a time series; the first verdict
/// found wins, with or without a timestamp prefix.
pub fn parse_smart_log(content: &str) -> SmartStatus {
    let status = content.lines().find_map(|line| {
        let (_, rest) = Timestamp::split_prefix(line.trim());
        match classify(rest) {
            Some(ClassifiedLine::Smart(status)) => Some(status),
            _ => None,
        }
    });
    SmartStatus { status }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISK_LOG: &str = "\
2024-03-01-12h-00min-00sec: disk: sda 256G
2024-03-01-12h-00min-00sec: partition: sda1 100G ext4 / 42G used 45%
2024-03-01-12h-00min-00sec: partition: sda2 50G swap
2024-03-01-12h-00min-30sec: disk: sda 256G
2024-03-01-12h-00min-30sec: partition: sda1 100G ext4 / 43G used 46%
";

    #[test]
    fn cpu_log_round_trips_both_fields() {
        let content = "\
2024-03-01-12h-00min-00sec: CPU Usage: 42.5% CPU Temperature: 55.0°C
2024-03-01-12h-00min-30sec: CPU Usage: 43.0% CPU Temperature: 56.0°C
";
        let samples = parse_cpu_log(content);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].time.as_str(), "2024-03-01-12h-00min-00sec");
        assert_eq!(samples[0].usage, 42.5);
        assert_eq!(samples[0].temperature, 55.0);
        assert_eq!(samples[1].usage, 43.0);
    }

    #[test]
    fn gpu_log_accepts_missing_separator_space() {
        let content = "2024-03-01-12h-00min-00sec: GPU Usage: 17.0% GPU Temperature:49.0°C\n";
        let samples = parse_gpu_log(content);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].temperature, 49.0);
    }

    #[test]
    fn lines_without_timestamp_are_skipped() {
        let content = "CPU Usage: 42.5% CPU Temperature: 55.0°C\n";
        assert!(parse_cpu_log(content).is_empty());
    }

    #[test]
    fn memory_log_splits_ram_and_virtual() {
        let content = "\
2024-03-01-12h-00min-00sec: Memory Utilization: 61.2 Memory Used: 9.8 GB Memory Total: 16.0 GB
2024-03-01-12h-00min-00sec: Virtual Memory Utilization: 12.0 Virtual Memory Used: 0.5 GB Virtual Memory Total: 4.0 GB
2024-03-01-12h-00min-30sec: Memory Utilization: 62.0 Memory Used: 9.9 GB Memory Total: 16.0 GB
";
        let report = parse_memory_log(content);
        assert_eq!(report.ram.len(), 2);
        assert_eq!(report.virtual_memory.len(), 1);
        assert_eq!(report.ram[1].usage_percent, 62.0);
        assert_eq!(report.virtual_memory[0].total, 4.0);
    }

    #[test]
    fn disk_log_flushes_every_snapshot() {
        let snapshots = parse_disk_log(DISK_LOG);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].timestamp.as_str(), "2024-03-01-12h-00min-00sec");
        assert_eq!(snapshots[0].disks[0].partitions.len(), 2);
        assert_eq!(snapshots[1].timestamp.as_str(), "2024-03-01-12h-00min-30sec");
        assert_eq!(snapshots[1].disks[0].partitions.len(), 1);
        assert_eq!(
            snapshots[1].disks[0].partitions[0].used.as_deref(),
            Some("43G")
        );
    }

    #[test]
    fn disk_log_parse_is_idempotent() {
        let first = parse_disk_log(DISK_LOG);
        let second = parse_disk_log(DISK_LOG);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn network_log_derives_rates_in_order() {
        let content = "\
2024-03-01-12h-00min-00sec: Network Traffic: Interface: eth0 | Incoming_Bytes_Total: 500 | Outgoing_Bytes_Total: 0
2024-03-01-12h-00min-01sec: Network Traffic: Interface: eth0 | Incoming_Bytes_Total: 1500 | Outgoing_Bytes_Total: 3000
2024-03-01-12h-00min-02sec: Network Traffic: Interface: eth0 | Incoming_Bytes_Total: 100 | Outgoing_Bytes_Total: 100
";
        let samples = parse_network_log(content);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].incoming_bps, 0.0);
        assert_eq!(samples[1].incoming_bps, 1000.0);
        assert_eq!(samples[1].outgoing_bps, 3000.0);
        // Counter reset reports 0, never a negative rate.
        assert_eq!(samples[2].incoming_bps, 0.0);
    }

    #[test]
    fn uptime_log_skips_separator_lines() {
        let content = "\
==== load ====
2024-03-01-12h-00min-00sec: 14:03:21 up 2 days,  3:12, 2 users, load average: 0.52, 0.58, 0.59
";
        let samples = parse_uptime_log(content);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].uptime, "2 days, 3:12");
        assert_eq!(samples[0].load_fifteen, 0.59);
    }

    #[test]
    fn smart_log_reports_first_verdict_or_absent() {
        let content = "\
smartctl 7.2 2020-12-30 r5155
SMART overall-health self-assessment test result: PASSED
";
        assert_eq!(parse_smart_log(content).status.as_deref(), Some("PASSED"));
        assert_eq!(parse_smart_log("no verdict here").status, None);
    }

    #[test]
    fn file_names_select_the_parser() {
        assert_eq!(LogFile::from_file_name("cpu.log"), Some(LogFile::Cpu));
        assert_eq!(LogFile::from_file_name("load.log"), Some(LogFile::Load));
        assert_eq!(LogFile::from_file_name("notes.txt"), None);
    }
}
