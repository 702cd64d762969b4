use crate::classify::{ClassifiedLine, Gauge, MemoryKind};
use crate::history::History;
use crate::metrics::{GaugeSample, MemorySample};
use crate::timestamp::Timestamp;

/// Builds composite CPU/GPU/memory records from the live line stream.
///
/// A primary line (`Usage`/`Utilization`) appends a new entry to the family
/// history; a secondary line (`Temperature`/`Used`/`Total`) mutates the last
/// entry in place. A secondary line with no entry to complete is dropped, so
/// the final entry of a session may be missing trailing fields. Temperature
/// carries forward from the previous entry until its own line arrives.
#[derive(Debug)]
pub struct LiveAssembler {
    cpu: History<GaugeSample>,
    gpu: History<GaugeSample>,
    ram: History<MemorySample>,
    virt: History<MemorySample>,
}

impl LiveAssembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu: History::bounded(capacity),
            gpu: History::bounded(capacity),
            ram: History::bounded(capacity),
            virt: History::bounded(capacity),
        }
    }

    /// Untrimmed histories, for replaying a complete log file.
    pub fn unbounded() -> Self {
        Self {
            cpu: History::unbounded(),
            gpu: History::unbounded(),
            ram: History::unbounded(),
            virt: History::unbounded(),
        }
    }

    /// Applies one classified line. Returns `false` for line kinds this
    /// assembler does not own (disk, network, uptime, SMART).
    pub fn apply(&mut self, time: &Timestamp, line: &ClassifiedLine) -> bool {
        match line {
            ClassifiedLine::Usage(gauge, usage) => {
                let history = self.gauge_mut(*gauge);
                let temperature = history.last().map(|s| s.temperature).unwrap_or(0.0);
                history.push(GaugeSample {
                    time: time.clone(),
                    usage: *usage,
                    temperature,
                });
            }
            ClassifiedLine::Temperature(gauge, temperature) => {
                if let Some(last) = self.gauge_mut(*gauge).last_mut() {
                    last.temperature = *temperature;
                }
            }
            ClassifiedLine::GaugePair(gauge, usage, temperature) => {
                self.gauge_mut(*gauge).push(GaugeSample {
                    time: time.clone(),
                    usage: *usage,
                    temperature: *temperature,
                });
            }
            ClassifiedLine::MemUtilization(kind, usage_percent) => {
                self.memory_mut(*kind).push(MemorySample {
                    time: time.clone(),
                    usage_percent: *usage_percent,
                    used: 0.0,
                    total: 0.0,
                });
            }
            ClassifiedLine::MemUsed(kind, used) => {
                if let Some(last) = self.memory_mut(*kind).last_mut() {
                    last.used = *used;
                }
            }
            ClassifiedLine::MemTotal(kind, total) => {
                if let Some(last) = self.memory_mut(*kind).last_mut() {
                    last.total = *total;
                }
            }
            ClassifiedLine::MemTriple(kind, usage_percent, used, total) => {
                self.memory_mut(*kind).push(MemorySample {
                    time: time.clone(),
                    usage_percent: *usage_percent,
                    used: *used,
                    total: *total,
                });
            }
            _ => return false,
        }
        true
    }

    pub fn cpu(&self) -> &History<GaugeSample> {
        &self.cpu
    }

    pub fn gpu(&self) -> &History<GaugeSample> {
        &self.gpu
    }

    pub fn ram(&self) -> &History<MemorySample> {
        &self.ram
    }

    pub fn virtual_memory(&self) -> &History<MemorySample> {
        &self.virt
    }

    fn gauge_mut(&mut self, gauge: Gauge) -> &mut History<GaugeSample> {
        match gauge {
            Gauge::Cpu => &mut self.cpu,
            Gauge::Gpu => &mut self.gpu,
        }
    }

    fn memory_mut(&mut self, kind: MemoryKind) -> &mut History<MemorySample> {
        match kind {
            MemoryKind::Ram => &mut self.ram,
            MemoryKind::Virtual => &mut self.virt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn ts(sec: u32) -> Timestamp {
        Timestamp::parse(&format!("2024-03-01-12h-00min-{sec:02}sec")).unwrap()
    }

    fn apply(assembler: &mut LiveAssembler, time: &Timestamp, line: &str) -> bool {
        assembler.apply(time, &classify(line).unwrap())
    }

    #[test]
    fn usage_then_temperature_completes_one_sample() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "CPU Usage: 42.5%");
        apply(&mut a, &ts(0), "CPU Temperature: 55.0°C");

        let samples = a.cpu().to_vec();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].usage, 42.5);
        assert_eq!(samples[0].temperature, 55.0);
    }

    #[test]
    fn temperature_without_usage_is_a_noop() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "GPU Temperature: 60.0°C");
        assert!(a.gpu().is_empty());
    }

    #[test]
    fn temperature_carries_forward_until_replaced() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "CPU Usage: 40.0%");
        apply(&mut a, &ts(0), "CPU Temperature: 55.0°C");
        apply(&mut a, &ts(1), "CPU Usage: 45.0%");

        let samples = a.cpu().to_vec();
        assert_eq!(samples[1].usage, 45.0);
        assert_eq!(samples[1].temperature, 55.0);

        apply(&mut a, &ts(1), "CPU Temperature: 57.5°C");
        assert_eq!(a.cpu().last().unwrap().temperature, 57.5);
    }

    #[test]
    fn memory_triplet_fills_last_entry_in_place() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "Memory Utilization: 61.2");
        apply(&mut a, &ts(0), "Memory Used: 9.8 GB");
        apply(&mut a, &ts(0), "Memory Total: 16.0 GB");

        let samples = a.ram().to_vec();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].usage_percent, 61.2);
        assert_eq!(samples[0].used, 9.8);
        assert_eq!(samples[0].total, 16.0);
        assert!(a.virtual_memory().is_empty());
    }

    #[test]
    fn virtual_memory_is_a_separate_history() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "Memory Utilization: 61.2");
        apply(&mut a, &ts(0), "Virtual Memory Utilization: 11.0");
        apply(&mut a, &ts(0), "Virtual Memory Used: 0.5 GB");

        assert_eq!(a.ram().len(), 1);
        assert_eq!(a.ram().last().unwrap().used, 0.0);
        assert_eq!(a.virtual_memory().last().unwrap().used, 0.5);
    }

    #[test]
    fn combined_line_appends_a_full_sample() {
        let mut a = LiveAssembler::new(20);
        apply(&mut a, &ts(0), "CPU Usage: 42.5% CPU Temperature: 55.0°C");
        let s = a.cpu().last().unwrap().clone();
        assert_eq!((s.usage, s.temperature), (42.5, 55.0));
    }

    #[test]
    fn ignores_foreign_line_kinds() {
        let mut a = LiveAssembler::new(20);
        assert!(!apply(&mut a, &ts(0), "disk: sda 256G"));
    }

    #[test]
    fn history_is_trimmed_to_capacity() {
        let mut a = LiveAssembler::new(2);
        apply(&mut a, &ts(0), "CPU Usage: 1.0%");
        apply(&mut a, &ts(1), "CPU Usage: 2.0%");
        apply(&mut a, &ts(2), "CPU Usage: 3.0%");

        let samples = a.cpu().to_vec();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].usage, 2.0);
        assert_eq!(samples[1].usage, 3.0);
    }
}
