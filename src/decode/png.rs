//! PNG container parsing: signature, chunk iteration, IHDR validation, and
//! the top-level streaming decode entry points.
//!
//! Image data may be scattered over any number of consecutive IDAT chunks;
//! the chunk reader presents them to the zlib layer as one logical byte
//! stream, so neither zlib nor DEFLATE ever observes an IDAT boundary.

use super::byte_reader::{ByteReader, ByteSource};
use super::filter::Reconstructor;
use super::zlib;
use crate::color::ColorType;
use crate::error::PngError;

/// PNG file signature (magic bytes).
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest width or height the PNG standard allows.
const MAX_DIMENSION: u32 = (1 << 31) - 1;

/// A four-byte chunk type. Bit 5 of each byte is a property flag; the one
/// on the first byte marks the chunk as ancillary (safe to skip).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkType([u8; 4]);

impl ChunkType {
    const IHDR: ChunkType = ChunkType(*b"IHDR");
    const IDAT: ChunkType = ChunkType(*b"IDAT");
    const IEND: ChunkType = ChunkType(*b"IEND");

    fn is_ancillary(self) -> bool {
        self.0[0] & 0x20 != 0
    }
}

/// The validated contents of an IHDR chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// How samples map to pixels.
    pub color_type: ColorType,
    /// Compression method; always 0 (DEFLATE) after validation.
    pub compression_method: u8,
    /// Filter method; always 0 (adaptive) after validation.
    pub filter_method: u8,
    /// Interlace method; always 0 (none) after validation.
    pub interlace_method: u8,
}

impl ImageHeader {
    /// Bytes each pixel occupies in a raw scanline.
    pub fn bytes_per_pixel(&self) -> usize {
        self.color_type.samples_per_pixel() * (self.bit_depth / 8) as usize
    }

    /// Length in bytes of one raw scanline.
    pub fn scanline_len(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }
}

/// A PNG image decoded into a single pixel buffer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// How samples map to pixels.
    pub color_type: ColorType,
    /// Raw scanlines, concatenated top to bottom.
    pub pixels: Vec<u8>,
}

/// Decode a PNG image, streaming output through two caller-supplied sinks.
///
/// `on_header` is called exactly once with the validated header, before any
/// scanline. `on_row` is then called once per reconstructed scanline, in
/// order, with a borrowed view that is only valid for the duration of the
/// call. On success both sinks have run to completion; on error the caller
/// may have received any prefix of the rows.
pub fn decode<H, R>(data: &[u8], mut on_header: H, mut on_row: R) -> Result<(), PngError>
where
    H: FnMut(&ImageHeader),
    R: FnMut(&[u8]),
{
    let mut reader = ByteReader::new(data);

    for &expected in &PNG_SIGNATURE {
        let byte = reader.next_byte().ok_or(PngError::PrematureEndOfFile)?;
        if byte != expected {
            return Err(PngError::BadSignature);
        }
    }

    let (_, first_type) = read_chunk_header(&mut reader).ok_or(PngError::PrematureEndOfFile)?;
    if first_type != ChunkType::IHDR {
        return Err(PngError::InvalidFirstChunk);
    }
    let header = parse_image_header(&mut reader)?;
    on_header(&header);

    // Image data may span several IDAT chunks and need not split at
    // scanline boundaries; the reconstructor carries state across all of it.
    let mut reconstructor = Reconstructor::new(header.bytes_per_pixel(), header.scanline_len());

    // A chunk header the IDAT source read past the image data; it belongs
    // to this loop.
    let mut pending: Option<(u32, ChunkType)> = None;

    loop {
        let (length, chunk_type) = match pending.take() {
            Some(handed_back) => handed_back,
            None => {
                if reader.is_eof() {
                    break;
                }
                read_chunk_header(&mut reader).ok_or(PngError::PrematureEndOfFile)?
            }
        };

        match chunk_type {
            ChunkType::IHDR => return Err(PngError::MultipleIHDR),
            ChunkType::IDAT => {
                let mut idat = IdatSource::new(&mut reader, length);
                zlib::decompress_stream(&mut idat, |block| {
                    reconstructor.push(block, &mut on_row);
                })?;
                reconstructor.status()?;
                pending = idat.finish();
            }
            ChunkType::IEND => {
                reader.skip(4);
                return Ok(());
            }
            other if !other.is_ancillary() => {
                return Err(PngError::UnsupportedCriticalChunkEncountered);
            }
            _ => reader.skip(length as usize + 4),
        }
    }

    Ok(())
}

/// Decode a PNG image into a [`DecodedImage`] holding all scanlines.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, PngError> {
    let mut header: Option<ImageHeader> = None;
    let mut pixels = Vec::new();

    decode(data, |h| header = Some(*h), |row| {
        pixels.extend_from_slice(row);
    })?;

    // `decode` only returns Ok after the header sink has run.
    let header = header.ok_or(PngError::PrematureEndOfFile)?;
    Ok(DecodedImage {
        width: header.width,
        height: header.height,
        bit_depth: header.bit_depth,
        color_type: header.color_type,
        pixels,
    })
}

/// Read a chunk's length and type, or `None` if the input ends first.
fn read_chunk_header(reader: &mut ByteReader<'_>) -> Option<(u32, ChunkType)> {
    let length = reader.read_be_u32()?;
    let mut chunk_type = [0u8; 4];
    for byte in &mut chunk_type {
        *byte = reader.next_byte()?;
    }
    Some((length, ChunkType(chunk_type)))
}

/// Parse and validate the 13-byte IHDR payload, then step over its CRC.
fn parse_image_header(reader: &mut ByteReader<'_>) -> Result<ImageHeader, PngError> {
    let width = reader.read_be_u32().ok_or(PngError::PrematureEndOfFile)?;
    let height = reader.read_be_u32().ok_or(PngError::PrematureEndOfFile)?;
    let mut fields = [0u8; 5];
    for byte in &mut fields {
        *byte = reader.next_byte().ok_or(PngError::PrematureEndOfFile)?;
    }
    let [bit_depth, color_type, compression_method, filter_method, interlace_method] = fields;

    if width > MAX_DIMENSION {
        return Err(PngError::InvalidWidth);
    }
    if height > MAX_DIMENSION {
        return Err(PngError::InvalidHeight);
    }

    // Acceptable pairs per the PNG standard §11.2.2.
    let depth_valid = match color_type {
        0 => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
        3 => matches!(bit_depth, 1 | 2 | 4 | 8),
        2 | 4 | 6 => matches!(bit_depth, 8 | 16),
        _ => false,
    };
    if !depth_valid {
        return Err(PngError::InvalidColorTypeAndBitDepthCombination);
    }
    let color_type =
        ColorType::try_from(color_type).map_err(|_| PngError::InvalidColorTypeAndBitDepthCombination)?;

    if compression_method != 0 {
        return Err(PngError::UnsupportedCompressionMethod);
    }
    if filter_method != 0 {
        return Err(PngError::UnsupportedFilterMethod);
    }
    if interlace_method != 0 {
        return Err(PngError::UnsupportedInterlaceMethod);
    }

    // Standard-valid layouts this decoder does not implement: sub-byte
    // sample packing and palette expansion.
    if bit_depth < 8 {
        return Err(PngError::UnsupportedBitDepth);
    }
    if color_type == ColorType::Indexed {
        return Err(PngError::UnsupportedColorType);
    }

    reader.skip(4); // IHDR CRC; not validated.

    Ok(ImageHeader {
        width,
        height,
        bit_depth,
        color_type,
        compression_method,
        filter_method,
        interlace_method,
    })
}

/// Byte source that concatenates the payloads of consecutive IDAT chunks.
///
/// When one payload runs out it steps over the chunk's CRC and the next
/// chunk header; if that header names another IDAT the stream simply
/// continues there. A non-IDAT header ends the stream and is handed back
/// through [`IdatSource::finish`] for the chunk loop to process.
struct IdatSource<'r, 'a> {
    reader: &'r mut ByteReader<'a>,
    remaining: u32,
    trailing: Option<(u32, ChunkType)>,
    done: bool,
}

impl<'r, 'a> IdatSource<'r, 'a> {
    fn new(reader: &'r mut ByteReader<'a>, length: u32) -> Self {
        Self {
            reader,
            remaining: length,
            trailing: None,
            done: false,
        }
    }

    /// Step past whatever is left of the current chunk (unread payload
    /// bytes plus the CRC) and hand back any chunk header read beyond the
    /// image data.
    fn finish(mut self) -> Option<(u32, ChunkType)> {
        if !self.done {
            self.reader.skip(self.remaining as usize + 4);
        }
        self.trailing.take()
    }
}

impl ByteSource for IdatSource<'_, '_> {
    fn next_byte(&mut self) -> Option<u8> {
        loop {
            if self.remaining > 0 {
                self.remaining -= 1;
                return self.reader.next_byte();
            }
            if self.done {
                return None;
            }
            self.reader.skip(4); // current chunk's CRC
            if self.reader.is_eof() {
                self.done = true;
                return None;
            }
            match read_chunk_header(self.reader) {
                Some((length, ChunkType::IDAT)) => self.remaining = length,
                Some(header) => {
                    self.trailing = Some(header);
                    self.done = true;
                    return None;
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.remaining == 0 && self.done
    }
}
