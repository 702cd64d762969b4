use crate::metrics::NetworkSample;
use crate::timestamp::Timestamp;
use std::collections::HashMap;
use tracing::debug;

/// Derives non-negative throughput rates from cumulative byte counters,
/// one baseline per interface.
///
/// First sample for an interface, a baseline from a different interface, and
/// a non-positive time delta all yield a 0 rate rather than an error. A
/// counter that decreases (interface reset) reports 0 for that one sample and
/// re-anchors the baseline to the new totals.
#[derive(Debug, Default)]
pub struct RateTracker {
    last: HashMap<String, NetworkSample>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one counter sample into the tracker and returns the finished
    /// record with derived rates. Returns `None` when the timestamp token has
    /// no epoch-ms view, mirroring the skip policy for malformed lines.
    pub fn observe(
        &mut self,
        time: Timestamp,
        interface: &str,
        incoming_total: u64,
        outgoing_total: u64,
    ) -> Option<NetworkSample> {
        let timestamp = time.epoch_ms()?;
        let (incoming_bps, outgoing_bps) = rates(
            self.last.get(interface),
            interface,
            timestamp,
            incoming_total,
            outgoing_total,
        );

        let sample = NetworkSample {
            time,
            timestamp,
            interface: interface.to_string(),
            incoming_total,
            outgoing_total,
            incoming_bps,
            outgoing_bps,
        };
        self.last.insert(interface.to_string(), sample.clone());
        Some(sample)
    }
}

/// The rate derivation itself, separated from baseline bookkeeping.
/// Bps values are rounded to whole bytes per second.
pub fn rates(
    prev: Option<&NetworkSample>,
    interface: &str,
    timestamp_ms: i64,
    incoming_total: u64,
    outgoing_total: u64,
) -> (f64, f64) {
    let Some(prev) = prev else {
        return (0.0, 0.0);
    };
    if prev.interface != interface {
        return (0.0, 0.0);
    }

    let delta_sec = (timestamp_ms - prev.timestamp) as f64 / 1000.0;
    if delta_sec <= 0.0 {
        debug!(interface, "non-monotonic time between samples, rate forced to 0");
        return (0.0, 0.0);
    }

    // max(0, ..) absorbs counter resets; the next delta starts from the new
    // totals because the caller re-anchors the baseline unconditionally.
    let incoming = ((incoming_total as f64 - prev.incoming_total as f64) / delta_sec).max(0.0);
    let outgoing = ((outgoing_total as f64 - prev.outgoing_total as f64) / delta_sec).max(0.0);
    (incoming.round(), outgoing.round())
}
