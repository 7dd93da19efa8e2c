//! zlib framing around DEFLATE (RFC 1950).
//!
//! Validates the two-byte CMF/FLG header, skips a preset dictionary id if
//! one is flagged, streams the DEFLATE body, and verifies the big-endian
//! Adler-32 trailer against the decompressed output.

use super::bit_reader::BitReader;
use super::byte_reader::{ByteReader, ByteSource};
use super::inflate::inflate_stream;
use crate::adler32::Adler32;
use crate::error::ZlibError;

/// CMF compression-method nibble for DEFLATE.
const COMPRESSION_METHOD_DEFLATE: u32 = 8;

/// FLG bit announcing a preset dictionary id before the compressed body.
const FLAG_FDICT: u32 = 1 << 5;

/// Decompress a zlib stream held in memory.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, ZlibError> {
    let mut reader = ByteReader::new(data);
    let mut output = Vec::new();
    decompress_stream(&mut reader, |block| output.extend_from_slice(block))?;
    Ok(output)
}

/// Decompress a zlib stream from `source`, handing decompressed bytes to
/// `sink` as they become available.
///
/// The source only needs to yield the frame itself; reading stops right
/// after the four trailer bytes, so trailing data (such as a PNG chunk CRC)
/// is left untouched.
pub(crate) fn decompress_stream<S, F>(source: S, mut sink: F) -> Result<(), ZlibError>
where
    S: ByteSource,
    F: FnMut(&[u8]),
{
    let mut bits = BitReader::new(source);

    let cmf = bits.read_bits(8).ok_or(ZlibError::PrematureEndOfStream)?;
    let flg = bits.read_bits(8).ok_or(ZlibError::PrematureEndOfStream)?;

    if cmf & 0x0F != COMPRESSION_METHOD_DEFLATE {
        return Err(ZlibError::UnsupportedCompressionMethod);
    }
    if (cmf * 256 + flg) % 31 != 0 {
        return Err(ZlibError::HeaderChecksumError);
    }

    if flg & FLAG_FDICT != 0 {
        // A preset dictionary only matters for re-compression; skip its id.
        for _ in 0..4 {
            bits.read_bits(8).ok_or(ZlibError::PrematureEndOfStream)?;
        }
    }

    let mut adler = Adler32::new();
    inflate_stream(&mut bits, |block| {
        adler.update(block);
        sink(block);
    })?;

    // The trailer starts at the next byte boundary after the final block.
    bits.align_to_byte();
    let mut expected = 0u32;
    for _ in 0..4 {
        let byte = bits.read_bits(8).ok_or(ZlibError::PrematureEndOfStream)?;
        expected = (expected << 8) | byte;
    }

    if expected != adler.value() {
        return Err(ZlibError::ChecksumError);
    }
    Ok(())
}
