//! Lossless WebP output.
//!
//! The pure-Rust WebP encoder only has a lossless mode, so quality is ignored
//! and a size-targeted run against WebP resolves in a single encode.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder as CrateWebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::png::drop_alpha;
use super::{failure, EncodeError, Encoder};
use crate::buffer::PixelBuffer;
use crate::format::ImageFormat;

/// Lossless WebP (VP8L) output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPEncoder;

impl Encoder for WebPEncoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::WebP
    }

    fn is_lossless(&self) -> bool {
        true
    }

    fn encode(&self, buffer: &PixelBuffer, _quality: f32) -> Result<Vec<u8>, EncodeError> {
        let mut out = Cursor::new(Vec::new());
        let encoder = CrateWebPEncoder::new_lossless(&mut out);
        let (width, height) = buffer.dimensions();

        let written = if buffer.has_transparency() {
            encoder.write_image(buffer.pixels(), width, height, ExtendedColorType::Rgba8)
        } else {
            let rgb = drop_alpha(buffer.pixels());
            encoder.write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        };
        written.map_err(failure)?;

        Ok(out.into_inner())
    }
}
