/// Default compression level (balanced).
pub const DEFAULT_LEVEL: u32 = 6;
/// Highest level accepted by `DeflateOptions`.
pub const MAX_LEVEL: u32 = 9;

/// RFC 1952 member layout.
pub mod gzip {
    pub const MAGIC: [u8; 2] = [0x1f, 0x8b];
    pub const METHOD_DEFLATE: u8 = 8;
    pub const HEADER_LEN: usize = 10;
    pub const TRAILER_LEN: usize = 8;
    pub const OS_UNKNOWN: u8 = 255;

    pub const FHCRC: u8 = 0x02;
    pub const FEXTRA: u8 = 0x04;
    pub const FNAME: u8 = 0x08;
    pub const FCOMMENT: u8 = 0x10;
    pub const RESERVED: u8 = 0xE0;

    /// Longest header buffered before giving up on a missing terminator.
    /// Leaves room for a maximal FEXTRA field plus names.
    pub const MAX_HEADER_LEN: usize = 128 * 1024;
}
