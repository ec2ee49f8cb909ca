//! A decoder and encoder for the GIF image container format.
//!
//! The crate is built from three layers. The [`stream`] module provides
//! little-endian, offset-tracking access over in-memory byte buffers. The
//! [`lzw`] module implements the LZW codec with GIF's variable-bit-width
//! code semantics. The [`parser`] module walks the block structure of a GIF
//! file and assembles a [`gif::Gif`] record, while [`encoder`] serializes
//! one back to bytes.

pub mod encoder;
pub mod gif;
pub mod lzw;
pub mod parser;
pub mod stream;

/// The errors that can abort a parse, an encode or a stream operation.
///
/// A malformed block anywhere aborts decoding of the whole file, because
/// block boundaries cannot be recovered once misread. Unknown *extension
/// labels* are skipped and are never errors; unknown *block sentinels* are.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("not a GIF file: expected the signature 'GIF', found {0:?}")]
    SignatureMismatch(String),

    #[error("unknown block sentinel 0x{0:02x}")]
    UnknownBlock(u8),

    #[error("reading {needed} bytes at offset {offset} runs past the end of the stream")]
    StreamUnderrun { offset: usize, needed: usize },

    #[error("LZW code {0} has no entry in the code table")]
    InvalidLzwCode(u16),

    #[error("minimum LZW code size {0} is outside the supported range 1..=8")]
    UnsupportedCodeSize(u8),

    #[error("sub-block size runs past the end of the stream")]
    MalformedSubBlocks,

    #[error("cannot LZW-encode an empty index stream")]
    EmptyIndexStream,

    #[error("cannot finalize an odd number of bytes as 16-bit words")]
    OddWordBoundary,

    #[error("image data decoded to {got} pixels, expected {expected}")]
    PixelCountMismatch { expected: usize, got: usize },

    #[error("a frame has neither a local nor a global color table")]
    MissingColorTable,

    #[error("the parse was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
