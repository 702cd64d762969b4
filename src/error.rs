use std::io;
use thiserror::Error;

/// Failures of the I/O collaborators (report folders, sampler process).
/// The parsing core itself never fails: malformed input degrades to skipped
/// lines and zero-valued fields.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid report folder name: {0}")]
    InvalidFolderName(String),

    #[error("report folder not found: {0}")]
    FolderNotFound(String),

    #[error("sampler error: {0}")]
    Sampler(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
