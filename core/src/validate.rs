//! validate.rs
//! Constructor-argument and chunk validation.

use bytes::Bytes;

use crate::compression::CodecError;
use crate::types::StreamError;

pub const NOT_A_BUFFER: &str = "The provided value is not of type '(ArrayBuffer or ArrayBufferView)'";

/// A window over a shared buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    pub buffer: Bytes,
    pub byte_offset: usize,
    pub byte_length: usize,
}

impl ByteView {
    pub fn new(buffer: impl Into<Bytes>, byte_offset: usize, byte_length: usize) -> Self {
        Self { buffer: buffer.into(), byte_offset, byte_length }
    }
}

/// Anything a caller may hand to `write`. Only buffers and views are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Buffer(Bytes),
    View(ByteView),
    Text(String),
}

impl From<Bytes> for StreamChunk {
    fn from(b: Bytes) -> Self {
        StreamChunk::Buffer(b)
    }
}

impl From<Vec<u8>> for StreamChunk {
    fn from(v: Vec<u8>) -> Self {
        StreamChunk::Buffer(Bytes::from(v))
    }
}

impl From<&[u8]> for StreamChunk {
    fn from(s: &[u8]) -> Self {
        StreamChunk::Buffer(Bytes::copy_from_slice(s))
    }
}

impl<const N: usize> From<&[u8; N]> for StreamChunk {
    fn from(s: &[u8; N]) -> Self {
        StreamChunk::Buffer(Bytes::copy_from_slice(s))
    }
}

impl From<ByteView> for StreamChunk {
    fn from(v: ByteView) -> Self {
        StreamChunk::View(v)
    }
}

impl From<String> for StreamChunk {
    fn from(s: String) -> Self {
        StreamChunk::Text(s)
    }
}

impl From<&str> for StreamChunk {
    fn from(s: &str) -> Self {
        StreamChunk::Text(s.to_string())
    }
}

/// Reduce a chunk to exactly the bytes it covers.
pub fn normalize_chunk(chunk: StreamChunk) -> Result<Bytes, StreamError> {
    match chunk {
        StreamChunk::Buffer(bytes) => Ok(bytes),
        StreamChunk::View(view) => {
            let end = view
                .byte_offset
                .checked_add(view.byte_length)
                .filter(|end| *end <= view.buffer.len())
                .ok_or_else(|| {
                    StreamError::Validation(format!(
                        "view of {} bytes at offset {} is outside a buffer of {} bytes",
                        view.byte_length,
                        view.byte_offset,
                        view.buffer.len()
                    ))
                })?;
            Ok(view.buffer.slice(view.byte_offset..end))
        }
        StreamChunk::Text(_) => Err(StreamError::Validation(NOT_A_BUFFER.into())),
    }
}

pub fn missing_argument(name: &str) -> StreamError {
    StreamError::Construction(format!(
        "Failed to construct '{name}': 1 argument required, but only 0 present."
    ))
}

pub fn unsupported_format(name: &str, format: &str) -> StreamError {
    StreamError::Construction(format!(
        "Failed to construct '{name}': Unsupported compression format: '{format}'"
    ))
}

pub fn engine_construction(name: &str, err: &CodecError) -> StreamError {
    StreamError::Construction(format!("Failed to construct '{name}': {err}"))
}
