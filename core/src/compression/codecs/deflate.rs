//! Raw and zlib-wrapped deflate via flate2's low-level streaming state.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::compression::types::{CodecError, StreamCodec};
use crate::constants::{format_names, OUTPUT_RESERVE};

/// Run `input` through `c`, appending to `out`. With `finish` the stream is closed.
pub(crate) fn deflate_into(
    c: &mut Compress,
    mut input: &[u8],
    finish: bool,
    out: &mut Vec<u8>,
    codec: &'static str,
) -> Result<(), CodecError> {
    let flush = if finish { FlushCompress::Finish } else { FlushCompress::None };

    loop {
        out.reserve(OUTPUT_RESERVE);
        let before_in = c.total_in();
        let before_out = c.total_out();

        let status = c
            .compress_vec(input, out, flush)
            .map_err(|e| CodecError::Process { codec, msg: e.to_string() })?;

        let consumed = (c.total_in() - before_in) as usize;
        let produced = c.total_out() - before_out;
        input = &input[consumed..];
        let has_room = out.len() < out.capacity();

        match status {
            Status::StreamEnd => return Ok(()),
            Status::Ok | Status::BufError => {
                if !finish && input.is_empty() && has_room {
                    return Ok(());
                }
                if consumed == 0 && produced == 0 && has_room {
                    return Err(CodecError::Stalled { codec });
                }
            }
        }
    }
}

/// How far an inflate call got through its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InflateProgress {
    pub consumed: usize,
    pub ended: bool,
}

/// Inflate as much of `input` as possible. Stops early at end of stream.
pub(crate) fn inflate_into(
    d: &mut Decompress,
    input: &[u8],
    out: &mut Vec<u8>,
    codec: &'static str,
) -> Result<InflateProgress, CodecError> {
    let mut pos = 0usize;

    loop {
        out.reserve(OUTPUT_RESERVE);
        let before_in = d.total_in();
        let before_out = d.total_out();

        let status = d
            .decompress_vec(&input[pos..], out, FlushDecompress::None)
            .map_err(|e| CodecError::Corrupt { codec, msg: e.to_string() })?;

        let consumed = (d.total_in() - before_in) as usize;
        let produced = d.total_out() - before_out;
        pos += consumed;
        let has_room = out.len() < out.capacity();

        match status {
            Status::StreamEnd => return Ok(InflateProgress { consumed: pos, ended: true }),
            Status::Ok | Status::BufError => {
                if pos == input.len() && has_room {
                    return Ok(InflateProgress { consumed: pos, ended: false });
                }
                if consumed == 0 && produced == 0 && has_room {
                    return Err(CodecError::Stalled { codec });
                }
            }
        }
    }
}

/// Deflate compressor, raw or zlib-wrapped.
pub struct DeflateEncoder {
    inner: Compress,
    codec: &'static str,
}

impl DeflateEncoder {
    pub fn raw(level: Compression) -> Self {
        Self { inner: Compress::new(level, false), codec: format_names::DEFLATE_RAW }
    }

    pub fn zlib(level: Compression) -> Self {
        Self { inner: Compress::new(level, true), codec: format_names::DEFLATE }
    }
}

impl StreamCodec for DeflateEncoder {
    fn push(&mut self, input: &[u8], is_final: bool, out: &mut Vec<u8>) -> Result<(), CodecError> {
        deflate_into(&mut self.inner, input, is_final, out, self.codec)
    }
}

/// Deflate decompressor, raw or zlib-wrapped.
pub struct DeflateDecoder {
    inner: Decompress,
    ended: bool,
    codec: &'static str,
}

impl DeflateDecoder {
    pub fn raw() -> Self {
        Self { inner: Decompress::new(false), ended: false, codec: format_names::DEFLATE_RAW }
    }

    pub fn zlib() -> Self {
        Self { inner: Decompress::new(true), ended: false, codec: format_names::DEFLATE }
    }
}

impl StreamCodec for DeflateDecoder {
    fn push(&mut self, input: &[u8], is_final: bool, out: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.ended {
            if !input.is_empty() {
                return Err(CodecError::TrailingData { codec: self.codec });
            }
        } else {
            let progress = inflate_into(&mut self.inner, input, out, self.codec)?;
            if progress.ended {
                self.ended = true;
                if progress.consumed < input.len() {
                    return Err(CodecError::TrailingData { codec: self.codec });
                }
            }
        }

        if is_final && !self.ended {
            return Err(CodecError::UnexpectedEof { codec: self.codec });
        }
        Ok(())
    }
}
