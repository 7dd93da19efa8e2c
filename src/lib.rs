//! # depng
//!
//! A self-contained, read-only PNG decoder.
//!
//! This library decodes PNG images into raw scanlines with hand-implemented
//! decompression layers (DEFLATE, zlib framing, Adler-32) instead of
//! delegating to an external inflate implementation.
//!
//! ## Features
//!
//! - **Zero runtime dependencies**
//! - **Streaming output**: scanlines are handed to a caller-supplied sink as
//!   they are reconstructed, keeping memory proportional to the image width
//! - **Standalone compression layers**: the DEFLATE and zlib decoders are
//!   usable on their own byte streams
//!
//! ## Example
//!
//! ```rust
//! use depng::{decode, ImageHeader};
//!
//! // A hand-assembled 1x1 grayscale PNG: signature, IHDR, one IDAT holding a
//! // stored-block zlib stream for [filter 0, pixel 0x7F], then IEND.
//! let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
//! data.extend_from_slice(&[0, 0, 0, 13]); // IHDR length
//! data.extend_from_slice(b"IHDR");
//! data.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]);
//! data.extend_from_slice(&[0, 0, 0, 0]); // IHDR CRC (not validated)
//! data.extend_from_slice(&[0, 0, 0, 13]); // IDAT length
//! data.extend_from_slice(b"IDAT");
//! data.extend_from_slice(&[
//!     0x78, 0x01, // zlib header
//!     0x01, 0x02, 0x00, 0xFD, 0xFF, 0x00, 0x7F, // stored block, LEN=2
//!     0x00, 0x81, 0x00, 0x80, // Adler-32 of the two bytes
//! ]);
//! data.extend_from_slice(&[0, 0, 0, 0]); // IDAT CRC
//! data.extend_from_slice(&[0, 0, 0, 0]); // IEND length
//! data.extend_from_slice(b"IEND");
//! data.extend_from_slice(&[0, 0, 0, 0]); // IEND CRC
//!
//! let mut rows: Vec<Vec<u8>> = Vec::new();
//! decode(
//!     &data,
//!     |header: &ImageHeader| assert_eq!((header.width, header.height), (1, 1)),
//!     |row| rows.push(row.to_vec()),
//! )
//! .unwrap();
//!
//! assert_eq!(rows, vec![vec![0x7F]]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adler32;
pub mod color;
pub mod decode;
pub mod error;

pub use color::ColorType;
pub use decode::{decode, decode_image, DecodedImage, ImageHeader};
pub use error::{DeflateError, PngError, Result, ZlibError};
