//! One [`Decoder`] per supported container.
//!
//! The pixel decoding itself is the image crate's; what differs per codec is
//! how to tell a file that was cut short from one that is simply broken.

use super::Decoder;
use crate::format::ImageFormat;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_TRAILER: u8 = 0x3B;

/// How far from the end of a PNG stream to look for the `IEND` chunk.
const PNG_TAIL_WINDOW: usize = 64;

/// JPEG / JFIF / EXIF-JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegDecoder;

impl Decoder for JpegDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn looks_truncated(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(&JPEG_SOI) && !bytes.ends_with(&JPEG_EOI)
    }
}

/// PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngDecoder;

impl Decoder for PngDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn looks_truncated(&self, bytes: &[u8]) -> bool {
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return false;
        }
        let tail = &bytes[bytes.len().saturating_sub(PNG_TAIL_WINDOW)..];
        !tail.windows(4).any(|w| w == b"IEND")
    }
}

/// WebP (VP8, VP8L and extended).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPDecoder;

impl Decoder for WebPDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::WebP
    }

    fn looks_truncated(&self, bytes: &[u8]) -> bool {
        if !bytes.starts_with(b"RIFF") {
            return false;
        }
        if bytes.len() < 12 {
            return true;
        }
        // RIFF size counts everything after the 8-byte chunk header.
        let riff_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        riff_size.saturating_add(8) > bytes.len()
    }
}

/// GIF, first frame only.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifDecoder;

impl Decoder for GifDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn looks_truncated(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"GIF8") && bytes.last() != Some(&GIF_TRAILER)
    }
}

/// Windows BMP.
#[derive(Debug, Clone, Copy, Default)]
pub struct BmpDecoder;

impl Decoder for BmpDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn looks_truncated(&self, bytes: &[u8]) -> bool {
        if !bytes.starts_with(b"BM") {
            return false;
        }
        if bytes.len() < 6 {
            return true;
        }
        let file_size = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize;
        file_size > bytes.len()
    }
}

/// Baseline TIFF. Strip offsets can point anywhere, so truncation is only
/// detected by the decoder itself (as an unexpected EOF).
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffDecoder;

impl Decoder for TiffDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Tiff
    }
}

static JPEG: JpegDecoder = JpegDecoder;
static PNG: PngDecoder = PngDecoder;
static WEBP: WebPDecoder = WebPDecoder;
static GIF: GifDecoder = GifDecoder;
static BMP: BmpDecoder = BmpDecoder;
static TIFF: TiffDecoder = TiffDecoder;

/// Look up the decoder for a format. Every [`ImageFormat`] is decodable.
pub fn decoder_for(format: ImageFormat) -> &'static dyn Decoder {
    match format {
        ImageFormat::Jpeg => &JPEG,
        ImageFormat::Png => &PNG,
        ImageFormat::WebP => &WEBP,
        ImageFormat::Gif => &GIF,
        ImageFormat::Bmp => &BMP,
        ImageFormat::Tiff => &TIFF,
    }
}
