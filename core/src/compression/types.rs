//! compression/types.rs
//! Format identifiers, codec options, codec errors and the codec trait.
use std::fmt;

use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::{DEFAULT_LEVEL, MAX_LEVEL};
use crate::constants::format_names;

/// The closed set of supported DEFLATE framings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionFormat {
    /// RFC 1952 gzip member.
    Gzip,
    /// RFC 1950 zlib-wrapped deflate.
    Deflate,
    /// RFC 1951 raw deflate.
    DeflateRaw,
}

impl CompressionFormat {
    pub const ALL: [CompressionFormat; 3] = [
        CompressionFormat::Gzip,
        CompressionFormat::Deflate,
        CompressionFormat::DeflateRaw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompressionFormat::Gzip       => format_names::GZIP,
            CompressionFormat::Deflate    => format_names::DEFLATE,
            CompressionFormat::DeflateRaw => format_names::DEFLATE_RAW,
        }
    }
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Compress,
    Decompress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Compress   => f.write_str("compress"),
            Direction::Decompress => f.write_str("decompress"),
        }
    }
}

/// Options accepted by compressors. Decompressors take none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflateOptions {
    /// 0 (store) ..= 9 (best). `None` selects the default level.
    pub level: Option<u32>,
    /// Gzip only: original file name written to the FNAME field.
    pub filename: Option<String>,
    /// Gzip only: modification time in seconds since the epoch.
    pub mtime: Option<u32>,
}

impl DeflateOptions {
    pub fn with_level(level: u32) -> Self {
        Self { level: Some(level), ..Self::default() }
    }

    pub fn level(&self) -> Result<u32, CodecError> {
        match self.level {
            None => Ok(DEFAULT_LEVEL),
            Some(level) if level <= MAX_LEVEL => Ok(level),
            Some(level) => Err(CodecError::InvalidLevel { level }),
        }
    }

    pub fn compression(&self) -> Result<Compression, CodecError> {
        Ok(Compression::new(self.level()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{codec}: invalid compressed data: {msg}")]
    Corrupt { codec: &'static str, msg: String },

    #[error("{codec}: unexpected end of stream")]
    UnexpectedEof { codec: &'static str },

    #[error("{codec}: trailing data after end of stream")]
    TrailingData { codec: &'static str },

    #[error("{codec}: checksum mismatch (expected {expected:#010x}, got {actual:#010x})")]
    ChecksumMismatch { codec: &'static str, expected: u32, actual: u32 },

    #[error("{codec}: length mismatch (expected {expected}, got {actual})")]
    LengthMismatch { codec: &'static str, expected: u32, actual: u32 },

    #[error("{codec}: invalid header: {msg}")]
    InvalidHeader { codec: &'static str, msg: &'static str },

    #[error("{codec}: compression failed: {msg}")]
    Process { codec: &'static str, msg: String },

    #[error("{codec}: codec made no progress")]
    Stalled { codec: &'static str },

    #[error("invalid compression level {level} (expected 0..=9)")]
    InvalidLevel { level: u32 },

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// A synchronous, push-driven codec.
///
/// `push` consumes `input` completely and appends whatever output is ready to
/// `out`. With `is_final` set the codec must flush everything and verify that
/// the stream is complete.
pub trait StreamCodec: Send {
    fn push(&mut self, input: &[u8], is_final: bool, out: &mut Vec<u8>) -> Result<(), CodecError>;
}
