//! The shared line grammar.
//!
//! Both the live assembler and the batch parser classify lines through this
//! one module, so the two paths cannot drift apart. The classifier accepts
//! both the split live forms (`CPU Usage:` on one line, `CPU Temperature:` on
//! the next) and the combined persisted forms (both on one line), and returns
//! `None` for anything it does not recognize.

use crate::metrics::Partition;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gauge {
    Cpu,
    Gpu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    Ram,
    Virtual,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassifiedLine {
    /// `CPU Usage: 42.0%` (or GPU) with no temperature on the same line.
    Usage(Gauge, f64),
    /// `CPU Temperature: 55.0°C` (or GPU) on its own line.
    Temperature(Gauge, f64),
    /// Combined persisted form: usage and temperature on one line.
    GaugePair(Gauge, f64, f64),
    MemUtilization(MemoryKind, f64),
    MemUsed(MemoryKind, f64),
    MemTotal(MemoryKind, f64),
    /// Combined persisted form: utilization, used and total on one line.
    MemTriple(MemoryKind, f64, f64, f64),
    Disk {
        name: String,
        size: String,
    },
    Partition(Partition),
    Network {
        interface: String,
        incoming_total: u64,
        outgoing_total: u64,
    },
    Uptime {
        uptime: String,
        users: u32,
        load_one: f64,
        load_five: f64,
        load_fifteen: f64,
    },
    Smart(String),
}

static USAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(CPU|GPU) Usage:\s*([\d.]+)\s*%").unwrap());
static TEMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(CPU|GPU) Temperature:\s*([\d.]+)\s*°C").unwrap());
static MEM_UTIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Virtual )?Memory Utilization:\s*([\d.]+)").unwrap());
static MEM_USED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Virtual )?Memory Used:\s*([\d.]+)\s*GB").unwrap());
static MEM_TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Virtual )?Memory Total:\s*([\d.]+)\s*GB").unwrap());
static DISK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^disk\s*:\s*(\S+)\s+(\S+)").unwrap());
static PARTITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^partition\s*:\s*(.+)$").unwrap());
static IFACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Interface:\s*([^|]+)").unwrap());
static INCOMING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Incoming_Bytes_Total:\s*(\d+)").unwrap());
static OUTGOING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Outgoing_Bytes_Total:\s*(\d+)").unwrap());
static UPTIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{2}:\d{2}:\d{2}\s+up\s+(.+?),\s+(\d+)\s+users?,\s+load average:\s*([\d.]+),\s*([\d.]+),\s*([\d.]+)\s*$",
    )
    .unwrap()
});
static SMART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SMART overall-health self-assessment test result:\s*(\w+)").unwrap());

/// Classifies one line with its timestamp prefix already stripped.
/// Unrecognized lines are `None`, which callers skip silently.
pub fn classify(line: &str) -> Option<ClassifiedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with("disk") {
        if let Some(caps) = DISK_RE.captures(line) {
            return Some(ClassifiedLine::Disk {
                name: caps[1].to_string(),
                size: caps[2].to_string(),
            });
        }
    }

    if line.starts_with("partition") {
        if let Some(caps) = PARTITION_RE.captures(line) {
            return parse_partition(&caps[1]).map(ClassifiedLine::Partition);
        }
    }

    if line.contains("Network Traffic") {
        let interface = IFACE_RE.captures(line)?[1].trim().to_string();
        let incoming_total = INCOMING_RE.captures(line)?[1].parse().ok()?;
        let outgoing_total = OUTGOING_RE.captures(line)?[1].parse().ok()?;
        return Some(ClassifiedLine::Network {
            interface,
            incoming_total,
            outgoing_total,
        });
    }

    if let Some(caps) = USAGE_RE.captures(line) {
        let gauge = gauge_of(&caps[1]);
        let usage: f64 = caps[2].parse().ok()?;
        // Persisted logs put usage and temperature on one line.
        if let Some(tcaps) = TEMP_RE.captures(line) {
            if gauge_of(&tcaps[1]) == gauge {
                if let Ok(temperature) = tcaps[2].parse() {
                    return Some(ClassifiedLine::GaugePair(gauge, usage, temperature));
                }
            }
        }
        return Some(ClassifiedLine::Usage(gauge, usage));
    }
    if let Some(caps) = TEMP_RE.captures(line) {
        return Some(ClassifiedLine::Temperature(
            gauge_of(&caps[1]),
            caps[2].parse().ok()?,
        ));
    }

    if let Some(caps) = MEM_UTIL_RE.captures(line) {
        let kind = memory_kind(caps.get(1).is_some());
        let utilization: f64 = caps[2].parse().ok()?;
        let used = MEM_USED_RE
            .captures(line)
            .filter(|c| memory_kind(c.get(1).is_some()) == kind)
            .and_then(|c| c[2].parse().ok());
        let total = MEM_TOTAL_RE
            .captures(line)
            .filter(|c| memory_kind(c.get(1).is_some()) == kind)
            .and_then(|c| c[2].parse().ok());
        return Some(match (used, total) {
            (Some(used), Some(total)) => ClassifiedLine::MemTriple(kind, utilization, used, total),
            _ => ClassifiedLine::MemUtilization(kind, utilization),
        });
    }
    if let Some(caps) = MEM_USED_RE.captures(line).filter(|c| c.get(0).unwrap().start() == 0) {
        return Some(ClassifiedLine::MemUsed(
            memory_kind(caps.get(1).is_some()),
            caps[2].parse().ok()?,
        ));
    }
    if let Some(caps) = MEM_TOTAL_RE.captures(line).filter(|c| c.get(0).unwrap().start() == 0) {
        return Some(ClassifiedLine::MemTotal(
            memory_kind(caps.get(1).is_some()),
            caps[2].parse().ok()?,
        ));
    }

    if let Some(caps) = UPTIME_RE.captures(line) {
        return Some(ClassifiedLine::Uptime {
            uptime: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
            users: caps[2].parse().ok()?,
            load_one: caps[3].parse().ok()?,
            load_five: caps[4].parse().ok()?,
            load_fifteen: caps[5].parse().ok()?,
        });
    }

    if let Some(caps) = SMART_RE.captures(line) {
        return Some(ClassifiedLine::Smart(caps[1].to_string()));
    }

    None
}

fn gauge_of(name: &str) -> Gauge {
    if name == "GPU" {
        Gauge::Gpu
    } else {
        Gauge::Cpu
    }
}

fn memory_kind(virtual_prefix: bool) -> MemoryKind {
    if virtual_prefix {
        MemoryKind::Virtual
    } else {
        MemoryKind::Ram
    }
}

/// `<name> <size> <type> [<mount>] [<used> used] [<percent>%]`
///
/// The trailing fields are optional and position-dependent; a token is the
/// used-size when the token after it is the word `used`, a percentage when it
/// is all digits plus `%`, and the mount point otherwise.
fn parse_partition(rest: &str) -> Option<Partition> {
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_string();
    let size = tokens.next()?.to_string();
    let fs_type = tokens.next()?.to_string();

    let mut mount = None;
    let mut used = None;
    let mut use_percent = None;

    let trailing: Vec<&str> = tokens.collect();
    let mut i = 0;
    while i < trailing.len() {
        let tok = trailing[i];
        if trailing.get(i + 1) == Some(&"used") {
            used = Some(tok.to_string());
            i += 2;
            continue;
        }
        if is_percent(tok) {
            use_percent = Some(tok.to_string());
        } else if tok != "used" && mount.is_none() {
            mount = Some(tok.to_string());
        }
        i += 1;
    }

    Some(Partition {
        name,
        size,
        fs_type,
        mount,
        used,
        use_percent,
    })
}

fn is_percent(tok: &str) -> bool {
    tok.strip_suffix('%')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
