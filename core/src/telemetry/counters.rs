//! telemetry/counters.rs
//! Mutable counters collected while a transform runs.
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCounters {
    /// Chunks accepted by `write`.
    pub chunks_in: u64,
    pub bytes_in: u64,
    /// Non-empty chunks enqueued on the readable side.
    pub chunks_out: u64,
    pub bytes_out: u64,
    /// Writes that suspended on the backpressure threshold.
    pub drain_waits: u64,
    /// Error signals delivered to the readable side.
    pub errors: u64,
}

impl TransformCounters {
    pub fn add_input(&mut self, len: usize) {
        self.chunks_in += 1;
        self.bytes_in += len as u64;
    }

    pub fn add_output(&mut self, len: usize) {
        self.chunks_out += 1;
        self.bytes_out += len as u64;
    }

    pub fn add_drain_wait(&mut self) {
        self.drain_waits += 1;
    }

    pub fn add_error(&mut self) {
        self.errors += 1;
    }
}
