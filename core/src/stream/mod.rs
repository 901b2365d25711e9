//! stream/mod.rs
//! Streaming compression transforms.
//!
//! Notes:
//! - `CompressionStream` / `DecompressionStream` resolve a format name through
//!   the dispatch table and wrap the resulting engine in a bridge.
//! - Writers are awaited one chunk at a time; readers are `futures::Stream`s.

pub mod queue;
pub mod bridge;
pub mod factory;

pub use bridge::{TransformReader, TransformStream, TransformWriter};
pub use factory::*;
pub use queue::ReadableQueue;
