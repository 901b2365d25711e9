//! stream/factory.rs
//! Builds transform streams from a dispatch table and a format name.

use std::sync::Arc;

use log::debug;

use crate::compression::{DeflateOptions, Direction};
use crate::config::StreamConfig;
use crate::constants::{BACKPRESSURE_THRESHOLD, COMPRESSION_STREAM, DECOMPRESSION_STREAM};
use crate::dispatch::{DispatchTable, EngineFamily};
use crate::engine::{EngineContext, EventSink};
use crate::stream::bridge::{BridgeShared, TransformStream};
use crate::types::StreamError;
use crate::validate::{engine_construction, missing_argument, unsupported_format};

/// Constructor for one public stream type over one engine family.
#[derive(Debug, Clone)]
pub struct TransformFactory {
    name: &'static str,
    family: EngineFamily,
    options: Option<DeflateOptions>,
    config: StreamConfig,
}

impl TransformFactory {
    pub fn new(name: &'static str, family: EngineFamily) -> Self {
        Self { name, family, options: None, config: StreamConfig::global().clone() }
    }

    /// Options forwarded to engines that accept them.
    pub fn with_options(mut self, options: Option<DeflateOptions>) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn construct(&self, format: Option<&str>) -> Result<TransformStream, StreamError> {
        let format = format.ok_or_else(|| missing_argument(self.name))?;
        let factory = self
            .family
            .get(format)
            .ok_or_else(|| unsupported_format(self.name, format))?;

        let shared = Arc::new(BridgeShared::new(
            self.name,
            self.config.readable_high_water_mark,
            BACKPRESSURE_THRESHOLD,
        ));
        let ctx = EngineContext {
            events: shared.clone() as Arc<dyn EventSink>,
            queued: shared.queued.clone(),
        };

        let options = self.options.as_ref().filter(|_| factory.accepts_options());
        let engine = factory
            .build(options, ctx)
            .map_err(|e| engine_construction(self.name, &e))?;

        debug!("[BRIDGE] {}: constructed '{}' ({} engine)", self.name, format, engine.mode());
        Ok(TransformStream::new(engine, shared))
    }
}

pub fn make_compression_stream(table: &DispatchTable, options: Option<DeflateOptions>) -> TransformFactory {
    TransformFactory::new(COMPRESSION_STREAM, table.family(Direction::Compress).clone()).with_options(options)
}

pub fn make_decompression_stream(table: &DispatchTable) -> TransformFactory {
    TransformFactory::new(DECOMPRESSION_STREAM, table.family(Direction::Decompress).clone())
}

/// Compressing transform over the process-wide dispatch table.
pub struct CompressionStream;

impl CompressionStream {
    pub fn new(format: &str) -> Result<TransformStream, StreamError> {
        Self::construct(Some(format), None)
    }

    pub fn with_options(format: &str, options: DeflateOptions) -> Result<TransformStream, StreamError> {
        Self::construct(Some(format), Some(options))
    }

    /// `format` is `None` when the caller supplied no argument at all.
    pub fn construct(format: Option<&str>, options: Option<DeflateOptions>) -> Result<TransformStream, StreamError> {
        make_compression_stream(DispatchTable::global(), options).construct(format)
    }
}

/// Decompressing transform over the process-wide dispatch table.
pub struct DecompressionStream;

impl DecompressionStream {
    pub fn new(format: &str) -> Result<TransformStream, StreamError> {
        Self::construct(Some(format))
    }

    pub fn construct(format: Option<&str>) -> Result<TransformStream, StreamError> {
        make_decompression_stream(DispatchTable::global()).construct(format)
    }
}
