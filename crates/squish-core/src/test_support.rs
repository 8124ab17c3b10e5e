//! Fixture builders shared by the unit tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat as CrateFormat};

use crate::buffer::PixelBuffer;
use crate::format::ImageFormat;

/// Opaque RGBA gradient with a little high-frequency texture, so lossy
/// encoders produce sizes that actually depend on quality.
pub fn textured_buffer(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let noise = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) % 61;
            pixels.push(((x * 255) / width.max(1)) as u8 ^ noise as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push((((x + y) * 127) / (width + height).max(1)) as u8 + noise as u8);
            pixels.push(255);
        }
    }
    PixelBuffer::from_raw(width, height, pixels).unwrap()
}

/// Solid-color RGBA buffer.
pub fn solid_buffer(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
    let pixels = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    PixelBuffer::from_raw(width, height, pixels).unwrap()
}

/// Encode a buffer with the image crate directly, independent of our
/// encoders, to produce decoder inputs.
pub fn encode_fixture(buffer: &PixelBuffer, format: ImageFormat) -> Vec<u8> {
    let rgba = buffer.clone().into_rgba_image();
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).into_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };
    let mut out = Cursor::new(Vec::new());
    let crate_format: CrateFormat = format.to_image_format();
    img.write_to(&mut out, crate_format).unwrap();
    out.into_inner()
}
