//! Scanline filter reconstruction (PNG spec §9 "Filtering").
//!
//! The decompressed image data is a run of filtered scanlines, each one
//! filter-type byte followed by the filtered row. Rows arrive in arbitrary
//! slices (DEFLATE block output crossing IDAT boundaries), so the
//! reconstructor buffers a partial row between pushes and keeps only the
//! previous reconstructed row as prediction context.

use crate::error::PngError;

const FILTER_NONE: u8 = 0;
const FILTER_SUB: u8 = 1;
const FILTER_UP: u8 = 2;
const FILTER_AVERAGE: u8 = 3;
const FILTER_PAETH: u8 = 4;

/// Streaming scanline reconstructor.
///
/// Holds the two most recent rows plus at most one partial filtered row
/// carried across pushes; memory stays proportional to the row length no
/// matter how tall the image is. The first error latches: once a bad filter
/// type is seen, later bytes are dropped and the sink is never called again.
pub(crate) struct Reconstructor {
    bytes_per_pixel: usize,
    scanline_len: usize,
    current: Vec<u8>,
    previous: Vec<u8>,
    pending: Vec<u8>,
    error: Option<PngError>,
}

impl Reconstructor {
    /// Set up for rows of `scanline_len` bytes at `bytes_per_pixel`.
    pub fn new(bytes_per_pixel: usize, scanline_len: usize) -> Self {
        Self {
            bytes_per_pixel,
            scanline_len,
            current: vec![0; scanline_len],
            previous: vec![0; scanline_len],
            pending: Vec::with_capacity(scanline_len + 1),
            error: None,
        }
    }

    /// Feed a slice of decompressed image data, emitting every row it
    /// completes to `sink`.
    pub fn push<F: FnMut(&[u8])>(&mut self, mut data: &[u8], sink: &mut F) {
        if self.error.is_some() {
            return;
        }
        let row_len = self.scanline_len + 1;

        // Top up a partial row left over from the previous push.
        if !self.pending.is_empty() {
            let take = (row_len - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.pending.len() == row_len {
                let row = std::mem::take(&mut self.pending);
                self.process_row(&row, sink);
                self.pending = row;
                self.pending.clear();
            }
        }

        // Whole rows straight out of the input.
        while self.error.is_none() && data.len() >= row_len {
            let (row, rest) = data.split_at(row_len);
            self.process_row(row, sink);
            data = rest;
        }

        if self.error.is_none() {
            self.pending.extend_from_slice(data);
        }
    }

    /// The latched first error, if any.
    pub fn status(&self) -> Result<(), PngError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn process_row<F: FnMut(&[u8])>(&mut self, row: &[u8], sink: &mut F) {
        let filter = row[0];
        self.current.copy_from_slice(&row[1..]);

        if let Err(e) = unfilter_row(
            filter,
            &mut self.current,
            &self.previous,
            self.bytes_per_pixel,
        ) {
            self.error = Some(e);
            return;
        }

        sink(&self.current);
        std::mem::swap(&mut self.current, &mut self.previous);
    }
}

/// Reverse one scanline filter in place. `prev` is the reconstructed
/// previous row (all zeros for the first row).
fn unfilter_row(filter: u8, row: &mut [u8], prev: &[u8], bpp: usize) -> Result<(), PngError> {
    match filter {
        FILTER_NONE => Ok(()),
        FILTER_SUB => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
            Ok(())
        }
        FILTER_UP => {
            for i in 0..row.len() {
                row[i] = row[i].wrapping_add(prev[i]);
            }
            Ok(())
        }
        FILTER_AVERAGE => {
            for i in 0..row.len() {
                // The sum can reach 510; keep it in 16 bits before halving.
                let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                let above = prev[i] as u16;
                row[i] = row[i].wrapping_add(((left + above) / 2) as u8);
            }
            Ok(())
        }
        FILTER_PAETH => {
            for i in 0..row.len() {
                let a = if i >= bpp { row[i - bpp] } else { 0 };
                let b = prev[i];
                let c = if i >= bpp { prev[i - bpp] } else { 0 };
                row[i] = row[i].wrapping_add(paeth_predictor(a, b, c));
            }
            Ok(())
        }
        _ => Err(PngError::UnsupportedFilterType),
    }
}

/// Paeth predictor: whichever of left, above, upper-left lies closest to
/// `a + b - c`, with ties broken in that order.
#[inline]
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i32 + b as i32 - c as i32;
    let pa = (p - a as i32).abs();
    let pb = (p - b as i32).abs();
    let pc = (p - c as i32).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
