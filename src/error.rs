//! Error types for the depng library.
//!
//! Each decoding layer has its own error enum; lower-layer failures are
//! carried upward as payload of the enclosing layer's umbrella variant.

use std::fmt;

/// Result type alias for depng operations.
pub type Result<T, E = PngError> = std::result::Result<T, E>;

/// Errors that can occur while decoding a raw DEFLATE stream (RFC 1951).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateError {
    /// A stored block's NLEN field is not the one's complement of LEN.
    LengthCorrupt,
    /// A block used the reserved block type 11.
    InvalidBlockType,
    /// No symbol matches the bits read from the stream.
    CorruptSymbol,
    /// The compressed stream ended before decoding completed.
    EndOfStream,
    /// A dynamic code-length sequence is malformed (repeat with no previous
    /// length, or a repeat running past the declared count).
    InvalidDynamicReference,
    /// A back-reference points before the start of the output.
    CorruptDistance,
    /// A decoded symbol is outside the literal/length or distance alphabets.
    InvalidSymbol,
}

impl fmt::Display for DeflateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeflateError::LengthCorrupt => {
                write!(f, "stored block LEN/NLEN mismatch")
            }
            DeflateError::InvalidBlockType => {
                write!(f, "reserved block type")
            }
            DeflateError::CorruptSymbol => {
                write!(f, "no symbol matches the Huffman code")
            }
            DeflateError::EndOfStream => {
                write!(f, "unexpected end of compressed stream")
            }
            DeflateError::InvalidDynamicReference => {
                write!(f, "malformed dynamic code-length sequence")
            }
            DeflateError::CorruptDistance => {
                write!(f, "back-reference distance exceeds output size")
            }
            DeflateError::InvalidSymbol => {
                write!(f, "symbol outside the DEFLATE alphabets")
            }
        }
    }
}

impl std::error::Error for DeflateError {}

/// Errors that can occur while decoding a zlib-framed stream (RFC 1950).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZlibError {
    /// The stream ended inside the header or the Adler-32 trailer.
    PrematureEndOfStream,
    /// The CMF compression method is not 8 (DEFLATE).
    UnsupportedCompressionMethod,
    /// The CMF/FLG header failed its mod-31 check.
    HeaderChecksumError,
    /// The embedded DEFLATE body failed to decode.
    Deflate(DeflateError),
    /// The Adler-32 trailer does not match the decompressed output.
    ChecksumError,
}

impl fmt::Display for ZlibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZlibError::PrematureEndOfStream => {
                write!(f, "zlib stream ended prematurely")
            }
            ZlibError::UnsupportedCompressionMethod => {
                write!(f, "zlib compression method is not DEFLATE")
            }
            ZlibError::HeaderChecksumError => {
                write!(f, "zlib header failed its checksum")
            }
            ZlibError::Deflate(e) => {
                write!(f, "DEFLATE error: {e}")
            }
            ZlibError::ChecksumError => {
                write!(f, "Adler-32 mismatch")
            }
        }
    }
}

impl std::error::Error for ZlibError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZlibError::Deflate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeflateError> for ZlibError {
    fn from(e: DeflateError) -> Self {
        ZlibError::Deflate(e)
    }
}

/// Errors that can occur while decoding a PNG image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
    /// The file ended inside the signature, a chunk header, or a payload.
    PrematureEndOfFile,
    /// The first eight bytes are not the PNG signature.
    BadSignature,
    /// The first chunk is not IHDR.
    InvalidFirstChunk,
    /// A second IHDR chunk was encountered.
    MultipleIHDR,
    /// IHDR width exceeds 2^31 - 1.
    InvalidWidth,
    /// IHDR height exceeds 2^31 - 1.
    InvalidHeight,
    /// The (color type, bit depth) pair is not one the PNG standard allows.
    InvalidColorTypeAndBitDepthCombination,
    /// The bit depth is below 8; sub-byte sample unpacking is not supported.
    UnsupportedBitDepth,
    /// Indexed color requires palette expansion, which is not supported.
    UnsupportedColorType,
    /// IHDR names a compression method other than 0 (DEFLATE).
    UnsupportedCompressionMethod,
    /// IHDR names a filter method other than 0 (adaptive).
    UnsupportedFilterMethod,
    /// IHDR names an interlace method other than 0; Adam7 is not supported.
    UnsupportedInterlaceMethod,
    /// An unknown chunk with the critical bit set was encountered.
    UnsupportedCriticalChunkEncountered,
    /// The image data failed to decompress.
    Zlib(ZlibError),
    /// A scanline carries a filter type outside 0..=4.
    UnsupportedFilterType,
}

impl fmt::Display for PngError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PngError::PrematureEndOfFile => {
                write!(f, "file ended prematurely")
            }
            PngError::BadSignature => {
                write!(f, "not a PNG file")
            }
            PngError::InvalidFirstChunk => {
                write!(f, "first chunk is not IHDR")
            }
            PngError::MultipleIHDR => {
                write!(f, "more than one IHDR chunk")
            }
            PngError::InvalidWidth => {
                write!(f, "image width out of range")
            }
            PngError::InvalidHeight => {
                write!(f, "image height out of range")
            }
            PngError::InvalidColorTypeAndBitDepthCombination => {
                write!(f, "invalid color type and bit depth combination")
            }
            PngError::UnsupportedBitDepth => {
                write!(f, "bit depths below 8 are not supported")
            }
            PngError::UnsupportedColorType => {
                write!(f, "indexed color is not supported")
            }
            PngError::UnsupportedCompressionMethod => {
                write!(f, "unsupported compression method")
            }
            PngError::UnsupportedFilterMethod => {
                write!(f, "unsupported filter method")
            }
            PngError::UnsupportedInterlaceMethod => {
                write!(f, "interlaced images are not supported")
            }
            PngError::UnsupportedCriticalChunkEncountered => {
                write!(f, "unknown critical chunk")
            }
            PngError::Zlib(e) => {
                write!(f, "image data error: {e}")
            }
            PngError::UnsupportedFilterType => {
                write!(f, "unsupported scanline filter type")
            }
        }
    }
}

impl std::error::Error for PngError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PngError::Zlib(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ZlibError> for PngError {
    fn from(e: ZlibError) -> Self {
        PngError::Zlib(e)
    }
}
