//! Lossless PNG output.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder as CratePngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::{failure, EncodeError, Encoder};
use crate::buffer::PixelBuffer;
use crate::format::ImageFormat;

/// Lossless PNG output. Opaque buffers are written as RGB to save a channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl Encoder for PngEncoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn is_lossless(&self) -> bool {
        true
    }

    fn encode(&self, buffer: &PixelBuffer, _quality: f32) -> Result<Vec<u8>, EncodeError> {
        let mut out = Cursor::new(Vec::new());
        let encoder =
            CratePngEncoder::new_with_quality(&mut out, CompressionType::Default, FilterType::Adaptive);
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

/// Strip the alpha channel of an opaque RGBA buffer.
pub(crate) fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect()
}
