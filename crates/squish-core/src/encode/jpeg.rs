//! JPEG encoding, the lossy probe behind the target-size search.
//!
//! This module provides JPEG encoding using the `image` crate's JPEG encoder.
//! JPEG has no alpha channel, so translucent pixels are composited over
//! black, matching what a browser canvas produces when exporting JPEG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder as CrateJpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{failure, EncodeError, Encoder};
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::format::ImageFormat;

/// Lossy JPEG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder;

impl Encoder for JpegEncoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn is_lossless(&self) -> bool {
        false
    }

    fn encode(&self, buffer: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
        let rgb = flatten_to_rgb(buffer.pixels());
        let mut out = Cursor::new(Vec::new());
        let encoder = CrateJpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
        encoder
            .write_image(&rgb, buffer.width(), buffer.height(), ExtendedColorType::Rgb8)
            .map_err(failure)?;
        Ok(out.into_inner())
    }
}

/// Map a `[0, 1]` quality onto the JPEG scale (1-100).
///
/// Out-of-range and NaN inputs are clamped.
///
/// # Quality Guidelines
///
/// * 0.90-1.00: High quality, suitable for archival or further editing
/// * 0.80-0.90: Good quality, recommended for most uses
/// * 0.60-0.80: Medium quality, acceptable for web/social media
/// * Below 0.60: Low quality, visible artifacts
pub fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_nan() {
        0.0
    } else {
        quality.clamp(0.0, 1.0)
    };
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

/// Drop alpha by compositing over black.
fn flatten_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / CHANNELS * 3);
    for px in rgba.chunks_exact(CHANNELS) {
        let alpha = px[3] as u16;
        if alpha == 255 {
            rgb.extend_from_slice(&px[..3]);
        } else {
            rgb.extend(px[..3].iter().map(|&c| ((c as u16 * alpha + 127) / 255) as u8));
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
