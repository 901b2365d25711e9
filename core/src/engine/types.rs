use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::compression::{CodecError, DeflateOptions};

/// Everything an engine reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Output produced by one push. `is_final` marks the end of the stream.
    Data { chunk: Bytes, is_final: bool },
    /// The codec failed; the engine accepts no further work.
    Error { error: CodecError, is_final: bool },
    /// `bytes` left the engine's queue.
    Drain { bytes: usize },
}

/// Receiving end of an engine's events. Called from whichever thread runs the codec.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Sink that drops every event.
pub struct DiscardSink;

impl EventSink for DiscardSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Bytes accepted by an engine but not yet processed.
///
/// Written only by the engine, read by the bridge. Never negative.
#[derive(Debug, Clone, Default)]
pub struct QueueCounter(Arc<AtomicUsize>);

impl QueueCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub fn add(&self, n: usize) {
        self.0.fetch_add(n, Ordering::AcqRel);
    }

    pub fn sub(&self, n: usize) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| Some(v.saturating_sub(n)));
    }
}

/// Handles given to an engine when it is built.
#[derive(Clone)]
pub struct EngineContext {
    pub events: Arc<dyn EventSink>,
    pub queued: QueueCounter,
}

impl EngineContext {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self { events, queued: QueueCounter::new() }
    }

    /// Context whose events go nowhere.
    pub fn detached() -> Self {
        Self::new(Arc::new(DiscardSink))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Codec runs on its own thread; `push` returns immediately.
    Worker,
    /// Codec runs inside `push`.
    Inline,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::Worker => f.write_str("worker"),
            EngineMode::Inline => f.write_str("inline"),
        }
    }
}

/// A stateful compressor or decompressor owned by exactly one stream.
pub trait CodecEngine: Send {
    /// Hand a chunk to the engine. Results arrive as events.
    fn push(&mut self, chunk: Bytes, is_final: bool);

    /// Bytes pushed but not yet drained.
    fn queued_size(&self) -> usize;

    fn mode(&self) -> EngineMode;

    /// Release the engine. Later pushes report `EngineUnavailable`.
    fn terminate(&mut self);
}

/// Constructor for one (format, direction) engine.
pub trait EngineFactory: Send + Sync {
    /// Whether `build` honours `DeflateOptions`.
    fn accepts_options(&self) -> bool;

    fn build(
        &self,
        options: Option<&DeflateOptions>,
        ctx: EngineContext,
    ) -> Result<Box<dyn CodecEngine>, CodecError>;
}
