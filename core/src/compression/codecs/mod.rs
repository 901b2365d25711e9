//! compression/codecs/mod.rs
//! Concrete `StreamCodec` implementations, one encoder and one decoder per framing.

pub mod deflate;
pub mod gzip;

pub use deflate::{DeflateDecoder, DeflateEncoder};
pub use gzip::{GzipDecoder, GzipEncoder, GzipHeader};
