use std::io;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, trace, warn};

use crate::compression::{CodecError, StreamCodec};
use crate::engine::types::{CodecEngine, EngineContext, EngineEvent, EngineMode};

/// One unit of work for a codec thread.
#[derive(Debug)]
pub struct WorkerJob {
    pub chunk: Bytes,
    pub is_final: bool,
}

/// Engine whose codec runs on a dedicated thread fed by a channel.
pub struct WorkerEngine {
    label: String,
    tx: Option<Sender<WorkerJob>>,
    handle: Option<JoinHandle<()>>,
    ctx: EngineContext,
}

impl WorkerEngine {
    pub fn spawn(label: &str, codec: Box<dyn StreamCodec>, ctx: EngineContext) -> io::Result<Self> {
        let (tx, rx) = unbounded::<WorkerJob>();
        let worker_ctx = ctx.clone();

        let handle = thread::Builder::new()
            .name(format!("flate-{label}"))
            .spawn(move || run_codec_worker(rx, codec, worker_ctx))?;

        debug!("[WORKER] {label} started");
        Ok(Self {
            label: label.to_string(),
            tx: Some(tx),
            handle: Some(handle),
            ctx,
        })
    }

    /// Close the job channel and wait for the codec thread to exit.
    pub fn join(mut self) -> thread::Result<()> {
        self.tx.take();
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl CodecEngine for WorkerEngine {
    fn push(&mut self, chunk: Bytes, is_final: bool) {
        let len = chunk.len();
        self.ctx.queued.add(len);

        let sent = match &self.tx {
            Some(tx) => tx.send(WorkerJob { chunk, is_final }).is_ok(),
            None => false,
        };

        if !sent {
            self.ctx.queued.sub(len);
            self.ctx.events.emit(EngineEvent::Error {
                error: CodecError::EngineUnavailable(format!("{} worker has exited", self.label)),
                is_final,
            });
        }
    }

    fn queued_size(&self) -> usize {
        self.ctx.queued.get()
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Worker
    }

    fn terminate(&mut self) {
        if self.tx.take().is_some() {
            debug!("[WORKER] {} terminated", self.label);
        }
        // Detached: the thread finishes its current job and exits on the closed channel.
        self.handle.take();
    }
}

impl Drop for WorkerEngine {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Codec thread loop. Exits on channel close, after the final job, or on the first error.
pub fn run_codec_worker(rx: Receiver<WorkerJob>, mut codec: Box<dyn StreamCodec>, ctx: EngineContext) {
    while let Ok(job) = rx.recv() {
        let len = job.chunk.len();
        let mut out = Vec::new();

        match codec.push(&job.chunk, job.is_final, &mut out) {
            Ok(()) => {
                if !out.is_empty() || job.is_final {
                    ctx.events.emit(EngineEvent::Data { chunk: Bytes::from(out), is_final: job.is_final });
                }
                ctx.queued.sub(len);
                trace!("[WORKER] drained {len} bytes");
                ctx.events.emit(EngineEvent::Drain { bytes: len });
            }
            Err(error) => {
                warn!("[WORKER] codec failed: {error}");
                ctx.queued.sub(len);
                ctx.events.emit(EngineEvent::Error { error, is_final: job.is_final });
                break;
            }
        }

        if job.is_final {
            break;
        }
    }
    trace!("[WORKER] codec thread exiting");
}
