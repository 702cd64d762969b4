use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, ValueEnum)]
pub enum Mode {
    Console,
    Web,
    Both,
}

#[derive(Clone, Debug, Parser)]
#[command(
    name = "telemetry_monitor",
    about = "Parses sampler telemetry logs and serves live and historical views"
)]
pub struct Config {
    /// Output mode (console/web/both)
    #[arg(long, value_enum, default_value_t = Mode::Web)]
    pub mode: Mode,

    /// Bind address for HTTP server
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// HTTP server port
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Sampler command to run for live monitoring
    #[arg(long, default_value = "./monitor.sh")]
    pub sampler: String,

    /// Extra argument passed to the sampler (repeatable)
    #[arg(long = "sampler-arg")]
    pub sampler_args: Vec<String>,

    /// Directory holding persisted report folders
    #[arg(long, default_value = "system_reports")]
    pub reports_dir: PathBuf,

    /// History depth (number of samples kept per metric family)
    #[arg(long, default_value_t = 600)]
    pub history: usize,

    /// Console refresh interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub refresh_ms: u64,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn web_enabled(&self) -> bool {
        matches!(self.mode, Mode::Web | Mode::Both)
    }

    pub fn console_enabled(&self) -> bool {
        matches!(self.mode, Mode::Console | Mode::Both)
    }
}
