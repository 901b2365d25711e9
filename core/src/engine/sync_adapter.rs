//! Inline engine: runs a synchronous codec inside `push` while presenting the
//! same event contract as a worker engine.

use bytes::Bytes;
use log::{trace, warn};

use crate::compression::{CodecError, StreamCodec};
use crate::engine::types::{CodecEngine, EngineContext, EngineEvent, EngineMode};

pub struct InlineEngine {
    codec: Option<Box<dyn StreamCodec>>,
    ctx: EngineContext,
}

impl InlineEngine {
    pub fn new(codec: Box<dyn StreamCodec>, ctx: EngineContext) -> Self {
        Self { codec: Some(codec), ctx }
    }
}

impl CodecEngine for InlineEngine {
    fn push(&mut self, chunk: Bytes, is_final: bool) {
        let Some(codec) = self.codec.as_mut() else {
            self.ctx.events.emit(EngineEvent::Error {
                error: CodecError::EngineUnavailable("inline engine terminated".into()),
                is_final,
            });
            return;
        };

        let len = chunk.len();
        // Accounted before the codec runs so re-entrant observers see the bump.
        self.ctx.queued.add(len);

        let mut out = Vec::new();
        if let Err(error) = codec.push(&chunk, is_final, &mut out) {
            warn!("[INLINE] codec failed: {error}");
            self.ctx.events.emit(EngineEvent::Error { error, is_final });
            return;
        }

        if !out.is_empty() || is_final {
            self.ctx.events.emit(EngineEvent::Data { chunk: Bytes::from(out), is_final });
        }

        self.ctx.queued.sub(len);
        trace!("[INLINE] drained {len} bytes");
        self.ctx.events.emit(EngineEvent::Drain { bytes: len });
    }

    fn queued_size(&self) -> usize {
        self.ctx.queued.get()
    }

    fn mode(&self) -> EngineMode {
        EngineMode::Inline
    }

    fn terminate(&mut self) {
        self.codec = None;
    }
}
