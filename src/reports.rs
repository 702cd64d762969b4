use crate::batch::{
    parse_cpu_log, parse_disk_log, parse_gpu_log, parse_memory_log, parse_network_log,
    parse_smart_log, parse_uptime_log, LogFile,
};
use crate::error::{MonitorError, Result};
use crate::metrics::{
    DiskSnapshot, GaugeSample, MemoryReport, NetworkSample, SmartStatus, UptimeSample,
};
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// All parsed logs of one report folder.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Report {
    pub folder: String,
    pub cpu: Vec<GaugeSample>,
    pub gpu: Vec<GaugeSample>,
    pub memory: MemoryReport,
    pub disk: Vec<DiskSnapshot>,
    pub network: Vec<NetworkSample>,
    pub smart: SmartStatus,
    pub uptime: Vec<UptimeSample>,
}

/// Loads and parses one report folder. Folders are named with the same token
/// grammar as timestamps; anything else is rejected before touching the
/// filesystem. Files with unknown names are ignored.
pub fn load_report(reports_dir: &Path, folder: &str) -> Result<Report> {
    if Timestamp::parse(folder).is_none() {
        return Err(MonitorError::InvalidFolderName(folder.to_string()));
    }

    let folder_path = reports_dir.join(folder);
    if !folder_path.is_dir() {
        return Err(MonitorError::FolderNotFound(folder.to_string()));
    }

    let mut report = Report {
        folder: folder.to_string(),
        ..Report::default()
    };

    for entry in fs::read_dir(&folder_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(kind) = name.to_str().and_then(LogFile::from_file_name) else {
            debug!(file = ?name, "skipping unknown file in report folder");
            continue;
        };

        let content = fs::read_to_string(entry.path())?;
        match kind {
            LogFile::Cpu => report.cpu = parse_cpu_log(&content),
            LogFile::Gpu => report.gpu = parse_gpu_log(&content),
            LogFile::Memory => report.memory = parse_memory_log(&content),
            LogFile::Disk => report.disk = parse_disk_log(&content),
            LogFile::Network => report.network = parse_network_log(&content),
            LogFile::Smart => report.smart = parse_smart_log(&content),
            LogFile::Load => report.uptime = parse_uptime_log(&content),
        }
    }

    Ok(report)
}

/// Lists the report folders under `reports_dir`, newest token last.
/// A missing directory is an empty listing, not an error.
pub fn list_reports(reports_dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(reports_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if Timestamp::parse(name).is_some() {
                folders.push(name.to_string());
            }
        }
    }
    folders.sort();
    Ok(folders)
}
