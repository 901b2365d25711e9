//! compression/mod.rs
//! Push-driven gzip / zlib / raw-deflate codecs.
//!
//! Notes:
//! - The DEFLATE bit-stream comes from flate2; this layer only frames it.
//! - Every codec is synchronous: `push` finishes all work before returning.
//! - Registry resolves (format, direction) to a boxed codec.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
