//! Image decoding: opaque encoded bytes to a straight RGBA [`PixelBuffer`].
//!
//! This module provides:
//! - Format resolution from the declared MIME type and the magic bytes
//! - One [`Decoder`] implementation per supported codec
//! - Classification of failures into truncated vs. corrupt input
//!
//! # Format resolution
//!
//! The declared MIME type usually comes from a file extension. When the
//! content carries a recognizable signature, the signature wins; the declared
//! type is only used when sniffing finds nothing.
//!
//! # Examples
//!
//! ```ignore
//! use squish_core::decode::decode;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let buffer = decode(&bytes, "image/jpeg").unwrap();
//! println!("Decoded {}x{} image", buffer.width(), buffer.height());
//! ```

mod codecs;
mod types;

use std::io::{Cursor, ErrorKind};

use image::{ImageError, ImageReader};
use log::debug;

use crate::buffer::PixelBuffer;
use crate::format::ImageFormat;

pub use codecs::{
    decoder_for, BmpDecoder, GifDecoder, JpegDecoder, PngDecoder, TiffDecoder, WebPDecoder,
};
pub use types::{DecodeError, DecodeLimits};

/// Capability interface implemented once per decodable codec.
pub trait Decoder: Sync {
    /// The format this decoder reads.
    fn format(&self) -> ImageFormat;

    /// Whether `bytes` start like this format but are missing their end
    /// marker. Only consulted after decoding has already failed.
    fn looks_truncated(&self, _bytes: &[u8]) -> bool {
        false
    }

    /// Decode to straight RGBA8.
    fn decode(&self, bytes: &[u8], limits: &DecodeLimits) -> Result<PixelBuffer, DecodeError> {
        decode_with_image_crate(self, bytes, limits)
    }
}

/// Decode `source_bytes` using default [`DecodeLimits`].
///
/// # Errors
///
/// - `DecodeError::UnsupportedFormat` if neither the MIME type nor the
///   content identify a supported format
/// - `DecodeError::Truncated` if the data ends early
/// - `DecodeError::Corrupt` if the data is otherwise invalid
/// - `DecodeError::LimitsExceeded` if the image is too large
pub fn decode(source_bytes: &[u8], declared_mime: &str) -> Result<PixelBuffer, DecodeError> {
    decode_with_limits(source_bytes, declared_mime, &DecodeLimits::default())
}

/// Decode `source_bytes` with explicit resource limits.
pub fn decode_with_limits(
    source_bytes: &[u8],
    declared_mime: &str,
    limits: &DecodeLimits,
) -> Result<PixelBuffer, DecodeError> {
    decode_source(source_bytes, declared_mime, limits).map(|(_, buffer)| buffer)
}

/// Like [`decode_with_limits`], also returning the format the bytes were
/// decoded as.
pub fn decode_source(
    source_bytes: &[u8],
    declared_mime: &str,
    limits: &DecodeLimits,
) -> Result<(ImageFormat, PixelBuffer), DecodeError> {
    let format = resolve_format(source_bytes, declared_mime)?;
    if source_bytes.is_empty() {
        return Err(DecodeError::Truncated);
    }

    let buffer = decoder_for(format).decode(source_bytes, limits)?;
    debug!(
        "decoded {} as {}x{}",
        format,
        buffer.width(),
        buffer.height()
    );
    Ok((format, buffer))
}

/// Pick the format to decode with.
pub fn resolve_format(source_bytes: &[u8], declared_mime: &str) -> Result<ImageFormat, DecodeError> {
    let declared = ImageFormat::from_mime(declared_mime);
    match (declared, ImageFormat::sniff(source_bytes)) {
        (Some(declared), Some(sniffed)) if declared != sniffed => {
            debug!("declared {declared} but content is {sniffed}; using content");
            Ok(sniffed)
        }
        (_, Some(sniffed)) => Ok(sniffed),
        (Some(declared), None) => Ok(declared),
        (None, None) => Err(DecodeError::UnsupportedFormat(declared_mime.to_string())),
    }
}

fn decode_with_image_crate<D: Decoder + ?Sized>(
    decoder: &D,
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<PixelBuffer, DecodeError> {
    let mut reader = ImageReader::with_format(Cursor::new(bytes), decoder.format().to_image_format());
    reader.limits(limits.to_image_limits());

    let img = reader
        .decode()
        .map_err(|e| classify_error(decoder, bytes, e))?;

    PixelBuffer::from_rgba_image(img.into_rgba8())
        .ok_or_else(|| DecodeError::Corrupt("image has zero width or height".to_string()))
}

fn classify_error<D: Decoder + ?Sized>(decoder: &D, bytes: &[u8], err: ImageError) -> DecodeError {
    match err {
        ImageError::Limits(e) => DecodeError::LimitsExceeded(e.to_string()),
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        ImageError::IoError(e) if e.kind() == ErrorKind::UnexpectedEof => DecodeError::Truncated,
        other if decoder.looks_truncated(bytes) => {
            debug!("{} decode failed on incomplete stream: {other}", decoder.format());
            DecodeError::Truncated
        }
        other => DecodeError::Corrupt(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_fixture, solid_buffer, textured_buffer};

    // Minimal valid JPEG bytes (1x1 grayscale pixel)
    const MINIMAL_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06,
        0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B,
        0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20,
        0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31,
        0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF,
        0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00,
        0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
        0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05, 0x05,
        0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
        0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
        0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A,
        0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56,
        0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
        0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93,
        0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
        0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6,
        0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
        0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
        0xF8, 0xF9, 0xFA, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5,
        0xDB, 0x20, 0xA8, 0xF1, 0x7E, 0xFF, 0xD9,
    ];

    #[test]
    fn test_decode_minimal_jpeg_to_rgba() {
        let buf = decode(MINIMAL_JPEG, "image/jpeg").unwrap();
        assert_eq!(buf.dimensions(), (1, 1));
        // Grayscale source expands to RGBA
        assert_eq!(buf.pixels().len(), 4);
        assert_eq!(buf.pixels()[3], 255);
    }

    #[test]
    fn test_decode_png_preserves_alpha() {
        let src = solid_buffer(8, 4, [10, 20, 30, 128]);
        let png = encode_fixture(&src, ImageFormat::Png);

        let buf = decode(&png, "image/png").unwrap();
        assert_eq!(buf, src);
    }

    #[test]
    fn test_decode_every_format() {
        let src = textured_buffer(16, 12);
        for format in ImageFormat::ALL {
            let bytes = encode_fixture(&src, format);
            let buf = decode(&bytes, format.mime_type())
                .unwrap_or_else(|e| panic!("{format} failed: {e}"));
            assert_eq!(buf.dimensions(), (16, 12), "{format}");
        }
    }

    #[test]
    fn test_content_wins_over_declared_mime() {
        let png = encode_fixture(&textured_buffer(5, 5), ImageFormat::Png);
        let buf = decode(&png, "image/jpeg").unwrap();
        assert_eq!(buf.dimensions(), (5, 5));
    }

    #[test]
    fn test_unknown_mime_falls_back_to_sniffing() {
        let gif = encode_fixture(&textured_buffer(3, 7), ImageFormat::Gif);
        let buf = decode(&gif, "application/octet-stream").unwrap();
        assert_eq!(buf.dimensions(), (3, 7));
    }

    #[test]
    fn test_unsupported_format() {
        let result = decode(&[0x00, 0x01, 0x02, 0x03], "image/heic");
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_garbage_with_declared_mime_is_corrupt() {
        let result = decode(&[0x00, 0x01, 0x02, 0x03], "image/jpeg");
        assert!(matches!(result, Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_empty_bytes_are_truncated() {
        assert!(matches!(decode(&[], "image/png"), Err(DecodeError::Truncated)));
    }

    #[test]
    fn test_truncated_jpeg() {
        let result = decode(&MINIMAL_JPEG[0..20], "image/jpeg");
        assert!(matches!(result, Err(DecodeError::Truncated)), "{result:?}");
    }

    #[test]
    fn test_truncated_png() {
        let png = encode_fixture(&textured_buffer(32, 32), ImageFormat::Png);
        let result = decode(&png[..png.len() / 2], "image/png");
        assert!(matches!(result, Err(DecodeError::Truncated)), "{result:?}");
    }

    #[test]
    fn test_limits_exceeded() {
        let png = encode_fixture(&textured_buffer(64, 8), ImageFormat::Png);
        let limits = DecodeLimits {
            max_width: 32,
            ..Default::default()
        };
        let result = decode_with_limits(&png, "image/png", &limits);
        assert!(matches!(result, Err(DecodeError::LimitsExceeded(_))), "{result:?}");
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            resolve_format(MINIMAL_JPEG, "").unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            resolve_format(&[1, 2, 3], "image/webp").unwrap(),
            ImageFormat::WebP
        );
        assert!(resolve_format(&[1, 2, 3], "text/plain").is_err());
    }

    #[test]
    fn test_decode_source_reports_sniffed_format() {
        let png = encode_fixture(&solid_buffer(5, 3, [9, 8, 7, 255]), ImageFormat::Png);
        let (format, buffer) = decode_source(&png, "image/jpeg", &DecodeLimits::default()).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(buffer.dimensions(), (5, 3));
    }
}
