//! telemetry/mod.rs
//! Per-stream counters, stage timers and immutable snapshots.
//!
//! Notes:
//! - Counters are updated by the bridge under its state lock.
//! - Snapshots are plain values; taking one never blocks the stream.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
