//! The RGBA pixel buffer passed between pipeline stages.

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// A decoded raster in straight (non-premultiplied) RGBA8, row-major.
///
/// The buffer always satisfies `pixels.len() == width * height * 4` with
/// both dimensions non-zero; the constructors refuse anything else. Stages
/// take it by value and hand back a new one, so a buffer is never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA data, returning `None` if the length does not match the
    /// dimensions or either dimension is zero.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != byte_len(width, height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Take ownership of an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Option<Self> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }

    /// Convert into an `image::RgbaImage` without copying.
    pub fn into_rgba_image(self) -> image::RgbaImage {
        // Dimensions and length were validated on construction.
        image::RgbaImage::from_raw(self.width, self.height, self.pixels)
            .unwrap_or_else(|| image::RgbaImage::new(0, 0))
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Release the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).any(|px| px[3] != u8::MAX)
    }
}

/// Byte length of an RGBA8 buffer, or `None` if it does not fit in `usize`.
pub(crate) fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_valid() {
        let buf = PixelBuffer::from_raw(100, 50, vec![0u8; 100 * 50 * 4]).unwrap();
        assert_eq!(buf.dimensions(), (100, 50));
        assert_eq!(buf.pixel_count(), 5000);
        assert_eq!(buf.pixels().len(), 20000);
    }

    #[test]
    fn test_from_raw_rejects_length_mismatch() {
        assert!(PixelBuffer::from_raw(10, 10, vec![0u8; 10 * 10 * 3]).is_none());
        assert!(PixelBuffer::from_raw(10, 10, vec![0u8; 10 * 10 * 4 + 1]).is_none());
    }

    #[test]
    fn test_from_raw_rejects_zero_dimensions() {
        assert!(PixelBuffer::from_raw(0, 10, vec![]).is_none());
        assert!(PixelBuffer::from_raw(10, 0, vec![]).is_none());
    }

    #[test]
    fn test_rgba_image_conversion_keeps_pixels() {
        let pixels: Vec<u8> = (0..2 * 3 * 4).map(|i| i as u8).collect();
        let buf = PixelBuffer::from_raw(2, 3, pixels.clone()).unwrap();
        let img = buf.into_rgba_image();
        assert_eq!(img.dimensions(), (2, 3));
        assert_eq!(img.get_pixel(1, 0).0, [4, 5, 6, 7]);

        let back = PixelBuffer::from_rgba_image(img).unwrap();
        assert_eq!(back.into_pixels(), pixels);
    }

    #[test]
    fn test_has_transparency() {
        let opaque = PixelBuffer::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]).unwrap();
        assert!(!opaque.has_transparency());

        let clear = PixelBuffer::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
        assert!(clear.has_transparency());
    }
}
