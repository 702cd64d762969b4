use crate::storage::TelemetryStore;
use crate::units::size_to_gb;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::ExecutableCommand;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::error;

pub async fn run_console(
    store: Arc<TelemetryStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = render_once(&store) {
                    error!("Console render error: {}", e);
                }
            }
        }
    }
}

fn render_once(store: &TelemetryStore) -> std::io::Result<()> {
    let mut out = stdout();
    out.execute(MoveTo(0, 0))?;
    out.execute(Clear(ClearType::All))?;

    writeln!(out, "Telemetry Monitor (console)")?;
    writeln!(out, "Press Ctrl+C to exit.")?;
    writeln!(out)?;

    let view = store.view();

    match view.cpu.last() {
        Some(cpu) => {
            writeln!(
                out,
                "CPU: {}  {:.1}°C   ({})",
                color_pct(cpu.usage, 50.0, 80.0),
                cpu.temperature,
                cpu.time
            )?;
        }
        None => {
            writeln!(out, "Waiting for first sample...")?;
            out.flush()?;
            return Ok(());
        }
    }

    if let Some(gpu) = view.gpu.last() {
        writeln!(
            out,
            "GPU: {}  {:.1}°C",
            color_pct(gpu.usage, 50.0, 80.0),
            gpu.temperature
        )?;
    }

    if let Some(mem) = view.memory.ram.last() {
        writeln!(
            out,
            "Memory: {:.1} GB used / {:.1} GB total ({})",
            mem.used,
            mem.total,
            color_pct(mem.usage_percent, 70.0, 90.0)
        )?;
    }
    if let Some(vm) = view.memory.virtual_memory.last() {
        writeln!(
            out,
            "Virtual: {:.1} GB used / {:.1} GB total ({})",
            vm.used,
            vm.total,
            color_pct(vm.usage_percent, 70.0, 90.0)
        )?;
    }

    if let Some(net) = view.network.last() {
        writeln!(
            out,
            "Network [{}]: in {:.0} B/s  out {:.0} B/s   (totals {} / {})",
            net.interface, net.incoming_bps, net.outgoing_bps, net.incoming_total, net.outgoing_total
        )?;
    }

    if let Some(up) = view.uptime.last() {
        writeln!(
            out,
            "Up {} | {} users | load {:.2} / {:.2} / {:.2}",
            up.uptime, up.users, up.load_one, up.load_five, up.load_fifteen
        )?;
    }

    if let Some(status) = &view.smart.status {
        writeln!(out, "SMART: {}", status)?;
    }

    if let Some(snapshot) = view.disk.last() {
        writeln!(out)?;
        writeln!(out, "Disks @ {}:", snapshot.timestamp)?;
        for disk in &snapshot.disks {
            let used_gb: f64 = disk
                .partitions
                .iter()
                .map(|p| size_to_gb(p.used.as_deref().unwrap_or("")))
                .sum();
            writeln!(
                out,
                "  {}: {:.1} GB used / {:.1} GB",
                disk.name,
                used_gb,
                size_to_gb(&disk.size)
            )?;
            for p in &disk.partitions {
                writeln!(
                    out,
                    "    {} {} {}  {}",
                    p.name,
                    p.size,
                    p.mount.as_deref().unwrap_or("-"),
                    p.use_percent.as_deref().unwrap_or("")
                )?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn color_pct(value: f64, warn: f64, crit: f64) -> String {
    let s = format!("{value:.1}%");
    if value >= crit {
        s.with(Color::Red).to_string()
    } else if value >= warn {
        s.with(Color::Yellow).to_string()
    } else {
        s.with(Color::Green).to_string()
    }
}
