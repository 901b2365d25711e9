//! telemetry/snapshot.rs
//! Immutable view of a transform's counters and timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TransformCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub counters: TransformCounters,
    /// `bytes_out / bytes_in`; zero when nothing was written.
    pub ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TransformSnapshot {
    pub fn from(counters: &TransformCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let ratio = if counters.bytes_in > 0 {
            counters.bytes_out as f64 / counters.bytes_in as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_zero_without_input() {
        let snap = TransformSnapshot::from(&TransformCounters::default(), &TelemetryTimer::new());
        assert_eq!(snap.ratio, 0.0);
    }

    #[test]
    fn ratio_tracks_output_over_input() {
        let mut counters = TransformCounters::default();
        counters.add_input(200);
        counters.add_output(50);
        let snap = TransformSnapshot::from(&counters, &TelemetryTimer::new());
        assert_eq!(snap.ratio, 0.25);
        assert!(snap.to_json().unwrap().contains("\"bytes_out\":50"));
    }
}
