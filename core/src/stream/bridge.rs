//! stream/bridge.rs
//! The transform bridge: a writable half that feeds a codec engine and a
//! readable half that receives its output.
//!
//! Notes:
//! - Engine events may arrive on any thread; all bridge state sits behind one lock.
//! - A write resolves only once the engine's queue is below the threshold.
//! - `close` resolves exactly once, on the engine's final chunk.
//! - The first error wins; everything after it is ignored.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use futures::channel::oneshot;
use futures::future::poll_fn;
use futures::{Stream, StreamExt};
use log::{debug, trace, warn};

use crate::engine::{CodecEngine, EngineEvent, EngineMode, EventSink, QueueCounter};
use crate::stream::queue::ReadableQueue;
use crate::telemetry::{Stage, TelemetryTimer, TransformCounters, TransformSnapshot};
use crate::types::StreamError;
use crate::validate::{normalize_chunk, StreamChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Phase {
    Streaming,
    /// Final push issued; waiting for the engine's final chunk.
    Flushing,
    Terminated,
    Errored(StreamError),
}

impl Phase {
    fn is_terminal(&self) -> bool {
        matches!(self, Phase::Terminated | Phase::Errored(_))
    }

    fn writable(&self) -> Result<(), StreamError> {
        match self {
            Phase::Streaming => Ok(()),
            Phase::Flushing | Phase::Terminated => Err(StreamError::State("stream is closed")),
            Phase::Errored(e) => Err(e.clone()),
        }
    }
}

struct Inner {
    phase: Phase,
    queue: ReadableQueue,
    drain_waiter: Option<oneshot::Sender<()>>,
    finalize: Option<oneshot::Sender<()>>,
    flush_started: Option<Instant>,
    counters: TransformCounters,
    timer: TelemetryTimer,
}

impl Inner {
    /// Record `error` and error the readable side. False if already terminal.
    fn fail(&mut self, error: StreamError) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.queue.error(error.clone());
        self.phase = Phase::Errored(error);
        self.counters.add_error();
        self.drain_waiter = None;
        self.finalize = None;
        self.timer.finish();
        true
    }

    fn terminate(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = Phase::Terminated;
        self.queue.close();
        self.timer.finish();
    }

    fn recorded_error(&self) -> StreamError {
        match &self.phase {
            Phase::Errored(e) => e.clone(),
            _ => StreamError::State("engine released its waiter without an error"),
        }
    }
}

/// State shared by both halves and the engine's event sink.
pub(crate) struct BridgeShared {
    name: &'static str,
    inner: Mutex<Inner>,
    pub(crate) queued: QueueCounter,
    threshold: usize,
}

impl BridgeShared {
    pub(crate) fn new(name: &'static str, high_water_mark: usize, threshold: usize) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                phase: Phase::Streaming,
                queue: ReadableQueue::new(high_water_mark),
                drain_waiter: None,
                finalize: None,
                flush_started: None,
                counters: TransformCounters::default(),
                timer: TelemetryTimer::new(),
            }),
            queued: QueueCounter::new(),
            threshold,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> TransformSnapshot {
        let inner = self.lock();
        TransformSnapshot::from(&inner.counters, &inner.timer)
    }
}

impl EventSink for BridgeShared {
    fn emit(&self, event: EngineEvent) {
        let mut inner = self.lock();
        match event {
            EngineEvent::Error { error, .. } => {
                if inner.fail(StreamError::Engine(error.clone())) {
                    warn!("[BRIDGE] {}: engine error: {}", self.name, error);
                } else {
                    trace!("[BRIDGE] {}: ignoring error after termination: {}", self.name, error);
                }
            }
            EngineEvent::Data { chunk, is_final } => {
                if inner.phase.is_terminal() {
                    return;
                }
                if !chunk.is_empty() {
                    inner.counters.add_output(chunk.len());
                    inner.queue.enqueue(chunk);
                }
                if is_final {
                    if let Some(started) = inner.flush_started.take() {
                        inner.timer.add_stage_time(Stage::Flush, started.elapsed());
                    }
                    if let Some(tx) = inner.finalize.take() {
                        let _ = tx.send(());
                    }
                    // The final chunk ends the stream whether or not `close` is still awaited.
                    inner.terminate();
                }
            }
            EngineEvent::Drain { bytes } => {
                let queued = self.queued.get();
                trace!("[BRIDGE] {}: drained {} bytes, {} queued", self.name, bytes, queued);
                if queued < self.threshold {
                    if let Some(tx) = inner.drain_waiter.take() {
                        let _ = tx.send(());
                    }
                }
            }
        }
    }
}

/// Writable half. Each chunk is validated, pushed to the engine, and held
/// until the engine has room again.
pub struct TransformWriter {
    engine: Box<dyn CodecEngine>,
    shared: Arc<BridgeShared>,
}

impl TransformWriter {
    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    pub fn engine_mode(&self) -> EngineMode {
        self.engine.mode()
    }

    /// Bytes accepted by the engine but not yet processed.
    pub fn queued_size(&self) -> usize {
        self.engine.queued_size()
    }

    /// Readable-side high-water mark minus bytes waiting to be read.
    pub fn desired_size(&self) -> isize {
        self.shared.lock().queue.desired_size()
    }

    pub async fn write(&mut self, chunk: impl Into<StreamChunk>) -> Result<(), StreamError> {
        let bytes = normalize_chunk(chunk.into())?;

        let writable = self.shared.lock().phase.writable();
        writable.map_err(|e| self.release(e))?;

        if let Err(e) = readable_capacity(&self.shared).await {
            return Err(self.release(e));
        }

        let len = bytes.len();
        self.shared.lock().counters.add_input(len);

        let started = Instant::now();
        self.engine.push(bytes, false);
        let pushed = started.elapsed();

        let waiter = {
            let mut inner = self.shared.lock();
            inner.timer.add_stage_time(Stage::Push, pushed);
            match inner.phase.writable() {
                Err(e) => Err(e),
                Ok(()) if self.engine.queued_size() >= self.shared.threshold => {
                    // Installed under the lock so a drain cannot slip in between.
                    let (tx, rx) = oneshot::channel();
                    inner.drain_waiter = Some(tx);
                    inner.counters.add_drain_wait();
                    Ok(Some(rx))
                }
                Ok(()) => Ok(None),
            }
        };
        let waiter = waiter.map_err(|e| self.release(e))?;

        if let Some(rx) = waiter {
            trace!(
                "[BRIDGE] {}: write of {} bytes waiting for drain ({} queued)",
                self.shared.name,
                len,
                self.engine.queued_size()
            );
            let started = Instant::now();
            let drained = rx.await;
            self.shared.lock().timer.add_stage_time(Stage::DrainWait, started.elapsed());
            if drained.is_err() {
                let e = self.shared.lock().recorded_error();
                return Err(self.release(e));
            }
        }
        Ok(())
    }

    /// Finalize the engine and end the readable side once its final chunk is enqueued.
    pub async fn close(&mut self) -> Result<(), StreamError> {
        let finalized = {
            let mut inner = self.shared.lock();
            match inner.phase.writable() {
                Err(e) => Err(e),
                Ok(()) if inner.finalize.is_some() => Err(StreamError::State("flush already pending")),
                Ok(()) => {
                    let (tx, rx) = oneshot::channel();
                    inner.finalize = Some(tx);
                    inner.flush_started = Some(Instant::now());
                    inner.phase = Phase::Flushing;
                    Ok(rx)
                }
            }
        };
        let finalized = finalized.map_err(|e| self.release(e))?;

        debug!("[BRIDGE] {}: flushing ({} mode)", self.shared.name, self.engine.mode());
        self.engine.push(Bytes::new(), true);
        let result = finalized.await;

        let inner = self.shared.lock();
        match result {
            Ok(()) if inner.phase == Phase::Terminated => {
                debug!(
                    "[BRIDGE] {}: closed after {} bytes in, {} bytes out",
                    self.shared.name, inner.counters.bytes_in, inner.counters.bytes_out
                );
                Ok(())
            }
            _ => {
                let e = inner.recorded_error();
                drop(inner);
                Err(self.release(e))
            }
        }
    }

    /// Error both halves with `Aborted` and release the engine.
    pub fn abort(&mut self) {
        if self.shared.lock().fail(StreamError::Aborted) {
            debug!("[BRIDGE] {}: aborted", self.shared.name);
        }
        self.engine.terminate();
    }

    pub fn snapshot(&self) -> TransformSnapshot {
        self.shared.snapshot()
    }

    fn release(&mut self, error: StreamError) -> StreamError {
        if matches!(self.shared.lock().phase, Phase::Errored(_)) {
            self.engine.terminate();
        }
        error
    }
}

/// Resolves once the readable queue is below its high-water mark.
async fn readable_capacity(shared: &BridgeShared) -> Result<(), StreamError> {
    poll_fn(|cx| {
        let mut inner = shared.lock();
        if let Phase::Errored(e) = &inner.phase {
            return Poll::Ready(Err(e.clone()));
        }
        inner.queue.poll_capacity(cx).map(Ok)
    })
    .await
}

impl Drop for TransformWriter {
    fn drop(&mut self) {
        if self.shared.lock().fail(StreamError::Aborted) {
            debug!("[BRIDGE] {}: writer dropped before close", self.shared.name);
        }
        self.engine.terminate();
    }
}

/// Readable half: a stream of output chunks ending in `None` or one error.
pub struct TransformReader {
    shared: Arc<BridgeShared>,
}

impl TransformReader {
    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Error both halves with `Cancelled`. Queued output is discarded.
    pub fn cancel(&mut self) {
        if self.shared.lock().fail(StreamError::Cancelled) {
            debug!("[BRIDGE] {}: cancelled by reader", self.shared.name);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.shared.lock().phase.is_terminal()
    }

    pub fn snapshot(&self) -> TransformSnapshot {
        self.shared.snapshot()
    }

    /// Collect every remaining chunk.
    pub async fn read_all(&mut self) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl Stream for TransformReader {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.shared.lock().queue.poll_next(cx)
    }
}

impl Drop for TransformReader {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A writable/readable pair joined by a codec engine.
pub struct TransformStream {
    writer: TransformWriter,
    reader: TransformReader,
}

impl TransformStream {
    pub(crate) fn new(engine: Box<dyn CodecEngine>, shared: Arc<BridgeShared>) -> Self {
        Self {
            writer: TransformWriter { engine, shared: shared.clone() },
            reader: TransformReader { shared },
        }
    }

    pub fn name(&self) -> &'static str {
        self.writer.name()
    }

    pub fn engine_mode(&self) -> EngineMode {
        self.writer.engine_mode()
    }

    pub fn writable(&mut self) -> &mut TransformWriter {
        &mut self.writer
    }

    pub fn readable(&mut self) -> &mut TransformReader {
        &mut self.reader
    }

    pub fn into_parts(self) -> (TransformWriter, TransformReader) {
        (self.writer, self.reader)
    }
}
