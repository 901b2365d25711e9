//! compression-stream
//!
//! Streaming gzip / deflate / deflate-raw transforms.
//! Codecs run either on a dedicated worker thread or inline, chosen once per process.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod validate;

// Codecs and engines
pub mod compression;
pub mod engine;
pub mod dispatch;
pub mod telemetry;

// Stream layers
pub mod stream;
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{CompressionFormat, DeflateOptions};
    pub use crate::config::{EnginePreference, StreamConfig};
    pub use crate::engine::EngineMode;
    pub use crate::pipeline::{compress, decompress, run_pipeline, transform_all};
    pub use crate::stream::{CompressionStream, DecompressionStream, TransformReader, TransformStream, TransformWriter};
    pub use crate::telemetry::TransformSnapshot;
    pub use crate::types::StreamError;
    pub use crate::validate::{ByteView, StreamChunk};
}
