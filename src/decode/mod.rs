//! The decoding pipeline, bottom-up: byte and bit readers, Huffman tables,
//! DEFLATE, zlib framing, scanline reconstruction, and PNG parsing.

mod bit_reader;
mod byte_reader;
mod filter;
mod huffman;
pub mod inflate;
mod png;
pub mod zlib;

pub use png::{decode, decode_image, DecodedImage, ImageHeader};
