//! Gzip (RFC 1952) members.
//!
//! Encoding is flate2's `GzEncoder`. Decoding parses header, CRC-32 and ISIZE
//! here so that truncation and trailing data are detected while input arrives
//! in arbitrary pieces. Concatenated members decode back to back.

use std::io::Write;

use crc32fast::Hasher;
use flate2::write::GzEncoder;
use flate2::{Decompress, GzBuilder};

use crate::compression::codecs::deflate::inflate_into;
use crate::compression::constants::gzip;
use crate::compression::types::{CodecError, DeflateOptions, StreamCodec};
use crate::constants::format_names::GZIP;

/// Fields recovered from a gzip member header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GzipHeader {
    pub mtime: u32,
    pub filename: Option<String>,
    pub comment: Option<String>,
    /// Encoded header length in bytes.
    pub len: usize,
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn invalid(msg: &'static str) -> CodecError {
    CodecError::InvalidHeader { codec: GZIP, msg }
}

/// Zero-terminated field starting at `pos`; `None` while the terminator is missing.
fn read_cstr(buf: &[u8], pos: usize) -> Option<(String, usize)> {
    let end = buf[pos..].iter().position(|b| *b == 0)?;
    let value = String::from_utf8_lossy(&buf[pos..pos + end]).into_owned();
    Some((value, pos + end + 1))
}

/// Parse a member header from the front of `buf`.
/// Returns `Ok(None)` until enough bytes are buffered.
pub fn parse_header(buf: &[u8]) -> Result<Option<GzipHeader>, CodecError> {
    if buf.first().is_some_and(|b| *b != gzip::MAGIC[0])
        || buf.get(1).is_some_and(|b| *b != gzip::MAGIC[1])
    {
        return Err(invalid("bad magic bytes"));
    }
    if buf.len() < gzip::HEADER_LEN {
        return Ok(None);
    }
    if buf[2] != gzip::METHOD_DEFLATE {
        return Err(invalid("unsupported compression method"));
    }

    let flags = buf[3];
    if flags & gzip::RESERVED != 0 {
        return Err(invalid("reserved flag bits set"));
    }

    let mut header = GzipHeader { mtime: read_u32(buf, 4), ..GzipHeader::default() };
    let mut pos = gzip::HEADER_LEN;

    if flags & gzip::FEXTRA != 0 {
        if buf.len() < pos + 2 {
            return Ok(None);
        }
        pos += 2 + read_u16(buf, pos) as usize;
        if buf.len() < pos {
            return Ok(None);
        }
    }
    if flags & gzip::FNAME != 0 {
        let Some((name, next)) = read_cstr(buf, pos) else { return Ok(None) };
        header.filename = Some(name);
        pos = next;
    }
    if flags & gzip::FCOMMENT != 0 {
        let Some((comment, next)) = read_cstr(buf, pos) else { return Ok(None) };
        header.comment = Some(comment);
        pos = next;
    }
    if flags & gzip::FHCRC != 0 {
        if buf.len() < pos + 2 {
            return Ok(None);
        }
        let expected = read_u16(buf, pos);
        let actual = crc32fast::hash(&buf[..pos]) as u16;
        if expected != actual {
            return Err(invalid("header checksum mismatch"));
        }
        pos += 2;
    }

    header.len = pos;
    Ok(Some(header))
}

pub struct GzipEncoder {
    inner: GzEncoder<Vec<u8>>,
}

impl GzipEncoder {
    pub fn new(options: &DeflateOptions) -> Result<Self, CodecError> {
        let level = options.compression()?;
        let mut builder = GzBuilder::new()
            .mtime(options.mtime.unwrap_or(0))
            .operating_system(gzip::OS_UNKNOWN);
        if let Some(name) = &options.filename {
            builder = builder.filename(name.bytes().filter(|b| *b != 0).collect::<Vec<u8>>());
        }
        Ok(Self { inner: builder.write(Vec::new(), level) })
    }
}

fn process_error(e: std::io::Error) -> CodecError {
    CodecError::Process { codec: GZIP, msg: e.to_string() }
}

impl StreamCodec for GzipEncoder {
    fn push(&mut self, input: &[u8], is_final: bool, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.inner.write_all(input).map_err(process_error)?;
        if is_final {
            self.inner.try_finish().map_err(process_error)?;
        }
        out.append(self.inner.get_mut());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Body,
    Trailer,
    Done,
}

pub struct GzipDecoder {
    stage: Stage,
    /// Header or trailer bytes not yet complete.
    pending: Vec<u8>,
    inner: Decompress,
    crc: Hasher,
    size: u32,
    header: Option<GzipHeader>,
}

impl GzipDecoder {
    pub fn new() -> Self {
        Self {
            stage: Stage::Header,
            pending: Vec::with_capacity(gzip::HEADER_LEN),
            inner: Decompress::new(false),
            crc: Hasher::new(),
            size: 0,
            header: None,
        }
    }

    /// Header of the member, once it has been parsed.
    pub fn header(&self) -> Option<&GzipHeader> {
        self.header.as_ref()
    }

    /// Reset for a member following a completed one.
    fn next_member(&mut self) {
        self.stage = Stage::Header;
        self.pending.clear();
        self.inner.reset(false);
        self.crc = Hasher::new();
        self.size = 0;
    }

    fn verify_trailer(&self) -> Result<(), CodecError> {
        let expected = read_u32(&self.pending, 0);
        let actual = self.crc.clone().finalize();
        if expected != actual {
            return Err(CodecError::ChecksumMismatch { codec: GZIP, expected, actual });
        }

        let expected = read_u32(&self.pending, 4);
        if expected != self.size {
            return Err(CodecError::LengthMismatch { codec: GZIP, expected, actual: self.size });
        }
        Ok(())
    }
}

impl Default for GzipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamCodec for GzipDecoder {
    fn push(&mut self, mut input: &[u8], is_final: bool, out: &mut Vec<u8>) -> Result<(), CodecError> {
        while !input.is_empty() {
            match self.stage {
                Stage::Header => {
                    let buffered = self.pending.len();
                    self.pending.extend_from_slice(input);
                    match parse_header(&self.pending)? {
                        Some(header) => {
                            input = &input[header.len - buffered..];
                            self.pending.clear();
                            self.header = Some(header);
                            self.stage = Stage::Body;
                        }
                        None if self.pending.len() > gzip::MAX_HEADER_LEN => {
                            return Err(invalid("header too long"));
                        }
                        None => input = &[],
                    }
                }
                Stage::Body => {
                    let start = out.len();
                    let progress = inflate_into(&mut self.inner, input, out, GZIP)?;
                    self.crc.update(&out[start..]);
                    self.size = self.size.wrapping_add((out.len() - start) as u32);
                    input = &input[progress.consumed..];
                    if progress.ended {
                        self.stage = Stage::Trailer;
                    }
                }
                Stage::Trailer => {
                    let take = (gzip::TRAILER_LEN - self.pending.len()).min(input.len());
                    self.pending.extend_from_slice(&input[..take]);
                    input = &input[take..];
                    if self.pending.len() == gzip::TRAILER_LEN {
                        self.verify_trailer()?;
                        self.stage = Stage::Done;
                    }
                }
                Stage::Done => {
                    if input[0] != gzip::MAGIC[0] {
                        return Err(CodecError::TrailingData { codec: GZIP });
                    }
                    self.next_member();
                }
            }
        }

        if is_final && self.stage != Stage::Done {
            return Err(CodecError::UnexpectedEof { codec: GZIP });
        }
        Ok(())
    }
}
