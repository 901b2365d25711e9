//! compression/registry.rs
//! Codec factory: (format, direction) -> boxed `StreamCodec`.

use crate::compression::codecs::{DeflateDecoder, DeflateEncoder, GzipDecoder, GzipEncoder};
use crate::compression::types::{CodecError, CompressionFormat, DeflateOptions, Direction, StreamCodec};

pub fn create_compressor(
    format: CompressionFormat,
    options: Option<&DeflateOptions>,
) -> Result<Box<dyn StreamCodec>, CodecError> {
    let defaults = DeflateOptions::default();
    let options = options.unwrap_or(&defaults);

    match format {
        CompressionFormat::Gzip       => Ok(Box::new(GzipEncoder::new(options)?)),
        CompressionFormat::Deflate    => Ok(Box::new(DeflateEncoder::zlib(options.compression()?))),
        CompressionFormat::DeflateRaw => Ok(Box::new(DeflateEncoder::raw(options.compression()?))),
    }
}

pub fn create_decompressor(format: CompressionFormat) -> Box<dyn StreamCodec> {
    match format {
        CompressionFormat::Gzip       => Box::new(GzipDecoder::new()),
        CompressionFormat::Deflate    => Box::new(DeflateDecoder::zlib()),
        CompressionFormat::DeflateRaw => Box::new(DeflateDecoder::raw()),
    }
}

pub fn create_codec(
    format: CompressionFormat,
    direction: Direction,
    options: Option<&DeflateOptions>,
) -> Result<Box<dyn StreamCodec>, CodecError> {
    match direction {
        Direction::Compress   => create_compressor(format, options),
        Direction::Decompress => Ok(create_decompressor(format)),
    }
}
