//! DEFLATE decompression (RFC 1951).
//!
//! Decodes stored, fixed-Huffman and dynamic-Huffman blocks from a bit
//! stream, resolving back-references against everything emitted so far.
//! Output is streamed to a caller-supplied sink one completed block at a
//! time; block boundaries carry no meaning for the caller.

use super::bit_reader::BitReader;
use super::byte_reader::{ByteReader, ByteSource};
use super::huffman::HuffmanTree;
use crate::error::DeflateError;

/// Length base values for symbols 257-285 (RFC 1951 §3.2.5).
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for length symbols.
const LENGTH_EXTRA: [u32; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance base values for symbols 0-29.
const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols.
const DISTANCE_EXTRA: [u32; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// End-of-block symbol in the literal/length alphabet.
const SYMBOL_END_OF_BLOCK: u16 = 256;

/// Storage order of the code-length code lengths in a dynamic block header
/// (RFC 1951 §3.2.7).
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Decompress a raw DEFLATE stream held in memory.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, DeflateError> {
    let mut reader = ByteReader::new(data);
    let mut bits = BitReader::new(&mut reader);
    let mut output = Vec::new();
    inflate_stream(&mut bits, |block| output.extend_from_slice(block))?;
    Ok(output)
}

/// Decompress a DEFLATE stream from `bits`, handing each completed block's
/// bytes to `sink`.
///
/// One output buffer spans all blocks, so back-references resolve against
/// the cumulative output regardless of where block boundaries fall. Decoding
/// stops after the block whose header carries the final-block flag.
pub(crate) fn inflate_stream<S, F>(
    bits: &mut BitReader<S>,
    mut sink: F,
) -> Result<(), DeflateError>
where
    S: ByteSource,
    F: FnMut(&[u8]),
{
    let mut output = Vec::new();
    let mut flushed = 0;

    loop {
        let bfinal = bits.read_bit().ok_or(DeflateError::EndOfStream)?;
        let btype = bits.read_bits(2).ok_or(DeflateError::EndOfStream)?;

        match btype {
            0 => inflate_stored(bits, &mut output)?,
            1 => inflate_fixed(bits, &mut output)?,
            2 => inflate_dynamic(bits, &mut output)?,
            _ => return Err(DeflateError::InvalidBlockType),
        }

        if output.len() > flushed {
            sink(&output[flushed..]);
            flushed = output.len();
        }

        if bfinal == 1 {
            break;
        }
    }

    Ok(())
}

/// Decode a stored (uncompressed) block.
fn inflate_stored<S: ByteSource>(
    bits: &mut BitReader<S>,
    output: &mut Vec<u8>,
) -> Result<(), DeflateError> {
    // LEN/NLEN start at the next byte boundary.
    bits.align_to_byte();

    let len = bits.read_bits(16).ok_or(DeflateError::EndOfStream)?;
    let nlen = bits.read_bits(16).ok_or(DeflateError::EndOfStream)?;
    if nlen != !len & 0xFFFF {
        return Err(DeflateError::LengthCorrupt);
    }

    output.reserve(len as usize);
    for _ in 0..len {
        let byte = bits.read_bits(8).ok_or(DeflateError::EndOfStream)?;
        output.push(byte as u8);
    }
    Ok(())
}

/// Decode a block compressed with the fixed Huffman codes.
fn inflate_fixed<S: ByteSource>(
    bits: &mut BitReader<S>,
    output: &mut Vec<u8>,
) -> Result<(), DeflateError> {
    let lit_tree = HuffmanTree::fixed_literal();
    let dist_tree = HuffmanTree::fixed_distance();
    inflate_block(bits, output, &lit_tree, &dist_tree)
}

/// Decode a block compressed with dynamic Huffman codes.
fn inflate_dynamic<S: ByteSource>(
    bits: &mut BitReader<S>,
    output: &mut Vec<u8>,
) -> Result<(), DeflateError> {
    let (lit_tree, dist_tree) = read_dynamic_trees(bits)?;
    inflate_block(bits, output, &lit_tree, &dist_tree)
}

/// Read the code-length-compressed literal/length and distance trees that
/// open a dynamic block (RFC 1951 §3.2.7).
fn read_dynamic_trees<S: ByteSource>(
    bits: &mut BitReader<S>,
) -> Result<(HuffmanTree, HuffmanTree), DeflateError> {
    let hlit = bits.read_bits(5).ok_or(DeflateError::EndOfStream)? as usize + 257;
    let hdist = bits.read_bits(5).ok_or(DeflateError::EndOfStream)? as usize + 1;
    let hclen = bits.read_bits(4).ok_or(DeflateError::EndOfStream)? as usize + 4;

    // The code lengths of the code-length alphabet itself, stored in a fixed
    // scrambled order; positions past HCLEN stay 0.
    let mut cl_lengths = [0u8; 19];
    for &position in CODE_LENGTH_ORDER.iter().take(hclen) {
        cl_lengths[position] = bits.read_bits(3).ok_or(DeflateError::EndOfStream)? as u8;
    }
    let cl_tree = HuffmanTree::from_lengths(&cl_lengths);

    // Decode HLIT + HDIST code lengths, expanding the three repeat symbols.
    let total = hlit + hdist;
    let mut lengths = Vec::with_capacity(total);
    while lengths.len() < total {
        let symbol = cl_tree.decode_symbol(bits)?;
        match symbol {
            0..=15 => lengths.push(symbol as u8),
            16 => {
                let prev = *lengths
                    .last()
                    .ok_or(DeflateError::InvalidDynamicReference)?;
                let repeat = bits.read_bits(2).ok_or(DeflateError::EndOfStream)? as usize + 3;
                extend_lengths(&mut lengths, prev, repeat, total)?;
            }
            17 => {
                let repeat = bits.read_bits(3).ok_or(DeflateError::EndOfStream)? as usize + 3;
                extend_lengths(&mut lengths, 0, repeat, total)?;
            }
            18 => {
                let repeat = bits.read_bits(7).ok_or(DeflateError::EndOfStream)? as usize + 11;
                extend_lengths(&mut lengths, 0, repeat, total)?;
            }
            _ => return Err(DeflateError::InvalidSymbol),
        }
    }

    let lit_tree = HuffmanTree::from_lengths(&lengths[..hlit]);
    let dist_tree = HuffmanTree::from_lengths(&lengths[hlit..]);
    Ok((lit_tree, dist_tree))
}

fn extend_lengths(
    lengths: &mut Vec<u8>,
    value: u8,
    repeat: usize,
    total: usize,
) -> Result<(), DeflateError> {
    if lengths.len() + repeat > total {
        return Err(DeflateError::InvalidDynamicReference);
    }
    lengths.resize(lengths.len() + repeat, value);
    Ok(())
}

/// Decode the body of a Huffman-coded block into `output`.
fn inflate_block<S: ByteSource>(
    bits: &mut BitReader<S>,
    output: &mut Vec<u8>,
    lit_tree: &HuffmanTree,
    dist_tree: &HuffmanTree,
) -> Result<(), DeflateError> {
    loop {
        let symbol = lit_tree.decode_symbol(bits)?;
        match symbol {
            0..=255 => output.push(symbol as u8),
            SYMBOL_END_OF_BLOCK => break,
            257..=285 => {
                let idx = (symbol - 257) as usize;
                let length = LENGTH_BASE[idx] as usize
                    + bits
                        .read_bits(LENGTH_EXTRA[idx])
                        .ok_or(DeflateError::EndOfStream)? as usize;

                let dist_symbol = dist_tree.decode_symbol(bits)?;
                if dist_symbol >= 30 {
                    return Err(DeflateError::InvalidSymbol);
                }
                let idx = dist_symbol as usize;
                let distance = DISTANCE_BASE[idx] as usize
                    + bits
                        .read_bits(DISTANCE_EXTRA[idx])
                        .ok_or(DeflateError::EndOfStream)? as usize;

                if distance > output.len() {
                    return Err(DeflateError::CorruptDistance);
                }

                // Copy byte by byte: the source range may overlap the bytes
                // being appended (distance < length repeats a short pattern).
                let mut pos = output.len() - distance;
                for _ in 0..length {
                    let byte = output[pos];
                    output.push(byte);
                    pos += 1;
                }
            }
            _ => return Err(DeflateError::InvalidSymbol),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate_empty_input() {
        assert_eq!(inflate(&[]), Err(DeflateError::EndOfStream));
    }

    #[test]
    fn test_inflate_fixed_no_repeats() {
        let data = [0x2B, 0x49, 0x2D, 0x2E, 0x51, 0x28, 0x81, 0x11, 0x8A, 0x00];
        assert_eq!(inflate(&data).unwrap(), b"test test test!");
    }

    #[test]
    fn test_inflate_fixed_hello_world() {
        let data = [
            0xCB, 0x48, 0xCD, 0xC9, 0xC9, 0x57, 0x28, 0xCF, 0x2F, 0xCA, 0x49, 0x01, 0x00,
        ];
        assert_eq!(inflate(&data).unwrap(), b"hello world");
    }

    #[test]
    fn test_inflate_fixed_with_back_reference() {
        let data = [0x2B, 0x49, 0x2D, 0x2E, 0x01, 0x00];
        assert_eq!(inflate(&data).unwrap(), b"test");
    }

    #[test]
    fn test_inflate_stored_block() {
        // BFINAL=1, BTYPE=00, LEN=256, NLEN=!256, then the bytes 0..=255.
        let mut data = vec![0x01, 0x00, 0x01, 0xFF, 0xFE];
        data.extend(0..=255u8);

        let expected: Vec<u8> = (0..=255u8).collect();
        assert_eq!(inflate(&data).unwrap(), expected);
    }

    #[test]
    fn test_inflate_stored_nlen_mismatch() {
        let data = [0x01, 0x05, 0x00, 0x00, 0x00, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(inflate(&data), Err(DeflateError::LengthCorrupt));
    }

    #[test]
    fn test_inflate_stored_truncated_payload() {
        let data = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'h', b'e'];
        assert_eq!(inflate(&data), Err(DeflateError::EndOfStream));
    }

    #[test]
    fn test_inflate_reserved_block_type() {
        // BFINAL=1, BTYPE=11.
        assert_eq!(inflate(&[0x07]), Err(DeflateError::InvalidBlockType));
    }

    #[test]
    fn test_inflate_distance_beyond_output() {
        // A fixed-Huffman block that opens with a length/distance pair
        // before any literal has been emitted: symbol 257 (code 0000001),
        // then distance symbol 0 (00000). Any distance exceeds the empty
        // output.
        //
        // Bit stream: 1 (BFINAL), 10 (BTYPE LSB-first), 0000001, 00000
        // packs to the two bytes below.
        let data = [0x03, 0x02];
        assert_eq!(inflate(&data), Err(DeflateError::CorruptDistance));
    }

    #[test]
    fn test_inflate_dynamic_repeat_before_any_length() {
        // Dynamic block whose code-length data immediately uses symbol 16
        // (repeat previous) with nothing to repeat.
        //
        // HLIT=0, HDIST=0, HCLEN=15 so all 19 code-length slots are read.
        // Slot order gives symbol 16 length 1 and symbol 0 length 1; the
        // first decoded code-length symbol is 16.
        let mut data = Vec::new();
        let mut bit_buf = 0u64;
        let mut bits_in_buf = 0u32;
        let mut push = |value: u64, n: u32, data: &mut Vec<u8>| {
            bit_buf |= value << bits_in_buf;
            bits_in_buf += n;
            while bits_in_buf >= 8 {
                data.push(bit_buf as u8);
                bit_buf >>= 8;
                bits_in_buf -= 8;
            }
        };
        push(1, 1, &mut data); // BFINAL
        push(0b10, 2, &mut data); // BTYPE=10 (dynamic)
        push(0, 5, &mut data); // HLIT
        push(0, 5, &mut data); // HDIST
        push(15, 4, &mut data); // HCLEN -> 19 entries
        // Code-length code lengths in storage order 16,17,18,0,8,...:
        // symbol 16 and symbol 0 get length 1, everything else 0.
        for i in 0..19 {
            let len = if i == 0 || i == 3 { 1 } else { 0 };
            push(len, 3, &mut data);
        }
        // Canonical codes: symbol 0 -> 0, symbol 16 -> 1.
        push(1, 1, &mut data); // symbol 16, with nothing before it to repeat
        push(0b11, 2, &mut data); // its repeat count (never read)
        push(0, 8, &mut data); // padding so EOF is not hit first
        if bits_in_buf > 0 {
            data.push(bit_buf as u8);
        }

        assert_eq!(inflate(&data), Err(DeflateError::InvalidDynamicReference));
    }

    #[test]
    fn test_inflate_dynamic_rfc1951_text() {
        // 509 bytes of dynamic-Huffman data holding the first 1000 bytes of
        // the RFC 1951 text.
        let data = include_bytes!("../../tests/data/rfc1951_dynamic.bin");
        let expected = include_bytes!("../../tests/data/rfc1951_first_1000.txt");
        assert_eq!(expected.len(), 1000);
        let output = inflate(data).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_inflate_streams_blocks_in_order() {
        // Two stored blocks; the sink must see their bytes in order.
        let mut data = vec![0x00, 0x02, 0x00, 0xFD, 0xFF, b'a', b'b'];
        data.extend_from_slice(&[0x01, 0x02, 0x00, 0xFD, 0xFF, b'c', b'd']);

        let mut reader = ByteReader::new(&data);
        let mut bits = BitReader::new(&mut reader);
        let mut blocks: Vec<Vec<u8>> = Vec::new();
        inflate_stream(&mut bits, |block| blocks.push(block.to_vec())).unwrap();
        assert_eq!(blocks, vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn test_inflate_back_reference_spans_blocks() {
        // Block 1 (stored, BFINAL=0) emits "abcd"; block 2 (fixed Huffman,
        // BFINAL=1) copies 4 bytes from distance 4, which only works if
        // back-references see output from the previous block.
        let mut data = vec![0x00, 0x04, 0x00, 0xFB, 0xFF, b'a', b'b', b'c', b'd'];
        // Fixed block: 1, 01, symbol 258 (len 4, code 0000010),
        // distance symbol 3 (dist 4, code 00011), end of block (0000000).
        let mut bit_buf = 0u64;
        let mut bits_in_buf = 0u32;
        let mut tail = Vec::new();
        let mut push_code = |code: u64, n: u32, out: &mut Vec<u8>| {
            for i in (0..n).rev() {
                bit_buf |= ((code >> i) & 1) << bits_in_buf;
                bits_in_buf += 1;
                if bits_in_buf == 8 {
                    out.push(bit_buf as u8);
                    bit_buf = 0;
                    bits_in_buf = 0;
                }
            }
        };
        push_code(0b1, 1, &mut tail); // BFINAL (single bit)
        push_code(0b10, 2, &mut tail); // BTYPE=01, LSB-first
        push_code(0b0000010, 7, &mut tail); // literal/length symbol 258
        push_code(0b00011, 5, &mut tail); // distance symbol 3
        push_code(0b0000000, 7, &mut tail); // end of block
        if bits_in_buf > 0 {
            tail.push(bit_buf as u8);
        }
        data.extend_from_slice(&tail);

        assert_eq!(inflate(&data).unwrap(), b"abcdabcd");
    }
}
