use log::debug;

use crate::compression::{create_codec, CodecError, CompressionFormat, DeflateOptions, Direction};
use crate::engine::sync_adapter::InlineEngine;
use crate::engine::types::{CodecEngine, EngineContext, EngineFactory, EngineMode};
use crate::engine::worker::WorkerEngine;

/// Builds flate2-backed engines for one format, direction and execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlateEngineFactory {
    pub format: CompressionFormat,
    pub direction: Direction,
    pub mode: EngineMode,
}

impl FlateEngineFactory {
    pub fn new(format: CompressionFormat, direction: Direction, mode: EngineMode) -> Self {
        Self { format, direction, mode }
    }
}

impl EngineFactory for FlateEngineFactory {
    fn accepts_options(&self) -> bool {
        self.direction == Direction::Compress
    }

    fn build(
        &self,
        options: Option<&DeflateOptions>,
        ctx: EngineContext,
    ) -> Result<Box<dyn CodecEngine>, CodecError> {
        let codec = create_codec(self.format, self.direction, options)?;
        debug!("[ENGINE] building {} {} engine ({})", self.format, self.direction, self.mode);

        match self.mode {
            EngineMode::Inline => Ok(Box::new(InlineEngine::new(codec, ctx))),
            EngineMode::Worker => {
                let label = format!("{}-{}", self.direction, self.format);
                let engine = WorkerEngine::spawn(&label, codec, ctx)
                    .map_err(|e| CodecError::EngineUnavailable(e.to_string()))?;
                Ok(Box::new(engine))
            }
        }
    }
}
