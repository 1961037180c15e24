//! Published run state.
//!
//! Triggers never return results to the caller; everything observable about
//! a sequence goes through snapshots handed to a [`StateSink`].

use std::time::{SystemTime, UNIX_EPOCH};

/// Point-in-time view of the sequencer state, published to the host's
/// display/variable layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSnapshot {
    pub running: bool,
    pub active_source_index: Option<u32>,
    pub active_source_label: String,
    pub last_routed_racks: Vec<u32>,
    /// Unix epoch milliseconds of the last accepted trigger.
    pub last_action_timestamp_ms: u64,
    /// Monotonic across runs; reset only when the engine is dropped.
    pub failed_steps_total: u64,
}

impl RunSnapshot {
    /// The rack id list rendered the way variable layers display it.
    pub fn last_routed_csv(&self) -> String {
        let mut out = String::new();
        for (i, id) in self.last_routed_racks.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&id.to_string());
        }
        out
    }
}

/// Consumer of published run state.
pub trait StateSink: Send + Sync {
    fn publish(&self, snapshot: &RunSnapshot);
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StateSink for NullSink {
    fn publish(&self, _snapshot: &RunSnapshot) {}
}

pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rendering() {
        let snapshot = RunSnapshot {
            last_routed_racks: vec![1, 2, 16],
            ..Default::default()
        };
        assert_eq!(snapshot.last_routed_csv(), "1,2,16");
        assert_eq!(RunSnapshot::default().last_routed_csv(), "");
    }
}
