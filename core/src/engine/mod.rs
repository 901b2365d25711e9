//! Codec engines: the push / data / drain contract shared by the worker and
//! inline variants.
//!
//! Responsibilities:
//! - Run a `StreamCodec` either on a dedicated thread or in the caller
//! - Account queued bytes and report drains
//! - Surface codec output and failures as `EngineEvent`s
//!
//! Non-responsibilities:
//! - Backpressure decisions (the bridge owns those)
//! - Format selection

pub mod types;
pub mod sync_adapter;
pub mod worker;
pub mod probe;
pub mod factory;

pub use types::{
    CodecEngine,
    EngineContext,
    EngineEvent,
    EngineFactory,
    EngineMode,
    EventSink,
    QueueCounter,
};
pub use sync_adapter::InlineEngine;
pub use worker::WorkerEngine;
pub use probe::Capability;
pub use factory::FlateEngineFactory;
