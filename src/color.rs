//! PNG color type definitions.

/// Color types a PNG image header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorType {
    /// Grayscale, one sample per pixel.
    Grayscale = 0,
    /// RGB, three samples per pixel.
    Rgb = 2,
    /// Palette indices, one sample per pixel.
    Indexed = 3,
    /// Grayscale with alpha, two samples per pixel.
    GrayscaleAlpha = 4,
    /// RGB with alpha, four samples per pixel.
    Rgba = 6,
}

impl ColorType {
    /// Returns the number of samples each pixel carries.
    #[inline]
    pub const fn samples_per_pixel(self) -> usize {
        match self {
            ColorType::Grayscale => 1,
            ColorType::Rgb => 3,
            ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgba => 4,
        }
    }
}

impl TryFrom<u8> for ColorType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColorType::Grayscale),
            2 => Ok(ColorType::Rgb),
            3 => Ok(ColorType::Indexed),
            4 => Ok(ColorType::GrayscaleAlpha),
            6 => Ok(ColorType::Rgba),
            other => Err(other),
        }
    }
}

impl From<ColorType> for u8 {
    fn from(color: ColorType) -> Self {
        color as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_pixel() {
        assert_eq!(ColorType::Grayscale.samples_per_pixel(), 1);
        assert_eq!(ColorType::Rgb.samples_per_pixel(), 3);
        assert_eq!(ColorType::Indexed.samples_per_pixel(), 1);
        assert_eq!(ColorType::GrayscaleAlpha.samples_per_pixel(), 2);
        assert_eq!(ColorType::Rgba.samples_per_pixel(), 4);
    }

    #[test]
    fn test_color_type_roundtrip_u8() {
        for (val, ct) in [
            (0u8, ColorType::Grayscale),
            (2u8, ColorType::Rgb),
            (3u8, ColorType::Indexed),
            (4u8, ColorType::GrayscaleAlpha),
            (6u8, ColorType::Rgba),
        ] {
            assert_eq!(u8::from(ct), val);
            assert_eq!(ColorType::try_from(val).unwrap(), ct);
        }
    }

    #[test]
    fn test_color_type_rejects_unknown_values() {
        for val in [1u8, 5, 7, 99] {
            assert_eq!(ColorType::try_from(val), Err(val));
        }
    }
}
