// Shared fixtures: a hand-driven engine whose drains, output and errors are
// emitted by the test itself.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use compression_stream::compression::{CodecError, DeflateOptions};
use compression_stream::config::StreamConfig;
use compression_stream::dispatch::EngineFamily;
use compression_stream::engine::{CodecEngine, EngineContext, EngineEvent, EngineFactory, EngineMode};
use compression_stream::stream::{TransformFactory, TransformStream};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What the test can see and drive of a `ManualEngine`.
#[derive(Clone, Default)]
pub struct ManualHandle {
    ctx: Arc<Mutex<Option<EngineContext>>>,
    pushed: Arc<Mutex<Vec<(Bytes, bool)>>>,
    options: Arc<Mutex<Option<DeflateOptions>>>,
    terminated: Arc<AtomicBool>,
}

impl ManualHandle {
    fn ctx(&self) -> EngineContext {
        self.ctx.lock().unwrap().clone().expect("engine not built yet")
    }

    pub fn queued(&self) -> usize {
        self.ctx().queued.get()
    }

    /// Mark `bytes` processed and report the drain.
    pub fn drain(&self, bytes: usize) {
        let ctx = self.ctx();
        ctx.queued.sub(bytes);
        ctx.events.emit(EngineEvent::Drain { bytes });
    }

    /// Lower the counter without reporting a drain.
    pub fn settle_silently(&self, bytes: usize) {
        self.ctx().queued.sub(bytes);
    }

    /// Report a drain without changing the counter.
    pub fn notify_drain(&self) {
        self.ctx().events.emit(EngineEvent::Drain { bytes: 0 });
    }

    pub fn data(&self, chunk: &[u8], is_final: bool) {
        self.ctx().events.emit(EngineEvent::Data { chunk: Bytes::copy_from_slice(chunk), is_final });
    }

    pub fn fail(&self, msg: &'static str) {
        self.ctx().events.emit(EngineEvent::Error {
            error: CodecError::InvalidHeader { codec: "manual", msg },
            is_final: false,
        });
    }

    pub fn pushed(&self) -> Vec<(Bytes, bool)> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn options(&self) -> Option<DeflateOptions> {
        self.options.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Engine that only records pushes and bumps the queued counter.
pub struct ManualEngine {
    ctx: EngineContext,
    handle: ManualHandle,
}

impl CodecEngine for ManualEngine {
    fn push(&mut self, chunk: Bytes, is_final: bool) {
        self.ctx.queued.add(chunk.len());
        self.handle.pushed.lock().unwrap().push((chunk, is_final));
    }

    fn queued_size(&self) -> usize {
        self.ctx.queued.get()
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Worker
    }

    fn terminate(&mut self) {
        self.handle.terminated.store(true, Ordering::SeqCst);
    }
}

pub struct ManualFactory {
    pub handle: ManualHandle,
    pub accepts_options: bool,
}

impl EngineFactory for ManualFactory {
    fn accepts_options(&self) -> bool {
        self.accepts_options
    }

    fn build(
        &self,
        options: Option<&DeflateOptions>,
        ctx: EngineContext,
    ) -> Result<Box<dyn CodecEngine>, CodecError> {
        *self.handle.ctx.lock().unwrap() = Some(ctx.clone());
        *self.handle.options.lock().unwrap() = options.cloned();
        Ok(Box::new(ManualEngine { ctx, handle: self.handle.clone() }))
    }
}

pub fn manual_factory(accepts_options: bool) -> (TransformFactory, ManualHandle) {
    let handle = ManualHandle::default();
    let family = EngineFamily::new().with(
        "manual",
        Arc::new(ManualFactory { handle: handle.clone(), accepts_options }),
    );
    let factory = TransformFactory::new("CompressionStream", family).with_config(StreamConfig::default());
    (factory, handle)
}

pub fn manual_stream() -> (TransformStream, ManualHandle) {
    let (factory, handle) = manual_factory(false);
    (factory.construct(Some("manual")).unwrap(), handle)
}
