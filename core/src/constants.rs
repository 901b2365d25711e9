//! constants.rs
//! Stream-wide limits and format names.

/// Queued-byte level inside an engine at which `write` suspends (32 KiB).
pub const BACKPRESSURE_THRESHOLD: usize = 32 * 1024;

/// Default high-water mark for both sides of a transform, in bytes (64 KiB).
pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;

/// Default chunk size used by the blocking pipeline reader.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Output reservation step while draining a flate2 stream.
pub const OUTPUT_RESERVE: usize = 16 * 1024;

/// Operation names used in construction errors.
pub const COMPRESSION_STREAM: &str = "CompressionStream";
pub const DECOMPRESSION_STREAM: &str = "DecompressionStream";

/// Canonical format identifiers.
pub mod format_names {
    pub const GZIP: &str = "gzip";
    pub const DEFLATE: &str = "deflate";
    pub const DEFLATE_RAW: &str = "deflate-raw";
}

/// Environment overrides read by `StreamConfig::from_env`.
pub mod env {
    pub const ENGINE: &str = "COMPRESSION_STREAM_ENGINE";
    pub const HIGH_WATER_MARK: &str = "COMPRESSION_STREAM_HWM";
}
