//! Canonical Huffman code construction and symbol decoding (RFC 1951 §3.2.2).

use super::bit_reader::BitReader;
use super::byte_reader::ByteSource;
use crate::error::DeflateError;

/// Maximum code length in any DEFLATE Huffman code.
const MAX_BITS: usize = 15;

/// A canonical prefix code held as tables: for each symbol its code length
/// (0 = absent) and its numeric code value.
///
/// Symbols of equal length carry consecutive codes in symbol order, and the
/// first code of length L+1 is `(first code of length L + count at L) << 1`.
pub(crate) struct HuffmanTree {
    lengths: Vec<u8>,
    codes: Vec<u16>,
    min_len: u32,
    max_len: u32,
}

impl HuffmanTree {
    /// Build the unique canonical code for the given per-symbol code lengths.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        // Step 1: count the number of codes for each code length.
        let mut bl_count = [0u32; MAX_BITS + 1];
        let mut min_len = 0u32;
        let mut max_len = 0u32;
        for &len in lengths {
            debug_assert!(len as usize <= MAX_BITS);
            bl_count[len as usize] += 1;
            if len != 0 {
                let len = len as u32;
                if min_len == 0 || len < min_len {
                    min_len = len;
                }
                max_len = max_len.max(len);
            }
        }

        // Step 2: find the numerical value of the smallest code per length.
        let mut next_code = [0u32; MAX_BITS + 1];
        let mut code = 0u32;
        bl_count[0] = 0;
        for bits in 1..=MAX_BITS {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        // Step 3: hand out consecutive codes to the symbols of each length.
        let mut codes = vec![0u16; lengths.len()];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len != 0 {
                let len = len as usize;
                codes[symbol] = (next_code[len] & ((1 << len) - 1)) as u16;
                next_code[len] += 1;
            }
        }

        Self {
            lengths: lengths.to_vec(),
            codes,
            min_len,
            max_len,
        }
    }

    /// The fixed literal/length code: symbols 0–143 at 8 bits, 144–255 at 9,
    /// 256–279 at 7, 280–287 at 8.
    pub fn fixed_literal() -> Self {
        let mut lengths = [0u8; 288];
        lengths[0..144].fill(8);
        lengths[144..256].fill(9);
        lengths[256..280].fill(7);
        lengths[280..288].fill(8);
        Self::from_lengths(&lengths)
    }

    /// The fixed distance code: all 30 symbols at 5 bits.
    pub fn fixed_distance() -> Self {
        Self::from_lengths(&[5u8; 30])
    }

    /// Decode one symbol from the bit stream.
    ///
    /// Consumes `min_len` Huffman bits, then extends the candidate code one
    /// bit at a time until it matches a symbol or exceeds `max_len`.
    pub fn decode_symbol<S: ByteSource>(
        &self,
        bits: &mut BitReader<S>,
    ) -> Result<u16, DeflateError> {
        if self.max_len == 0 {
            return Err(DeflateError::CorruptSymbol);
        }

        let mut len = self.min_len;
        let mut code = bits
            .read_huffman_bits(len)
            .ok_or(DeflateError::EndOfStream)? as u16;
        loop {
            if let Some(symbol) = self.find(len, code) {
                return Ok(symbol);
            }
            if len == self.max_len {
                return Err(DeflateError::CorruptSymbol);
            }
            let bit = bits.read_bit().ok_or(DeflateError::EndOfStream)? as u16;
            code = (code << 1) | bit;
            len += 1;
        }
    }

    fn find(&self, len: u32, code: u16) -> Option<u16> {
        self.lengths
            .iter()
            .zip(&self.codes)
            .position(|(&l, &c)| l as u32 == len && c == code)
            .map(|symbol| symbol as u16)
    }

    /// The (length, code) pair assigned to `symbol`, if it participates.
    #[cfg(test)]
    pub fn code_of(&self, symbol: usize) -> Option<(u8, u16)> {
        match self.lengths[symbol] {
            0 => None,
            len => Some((len, self.codes[symbol])),
        }
    }
}
