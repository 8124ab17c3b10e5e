//! Image encoding: a [`PixelBuffer`] plus a quality to compressed bytes.
//!
//! This module provides:
//! - The [`Encoder`] capability trait, implemented once per output codec
//! - [`encode`], the pure `(buffer, quality) -> bytes` probe used by the
//!   target-size search
//!
//! JPEG is the only lossy output. PNG and WebP are written losslessly and
//! ignore the quality parameter.
//!
//! # Examples
//!
//! ```ignore
//! use squish_core::encode::{encode, EncodeRequest};
//!
//! let jpeg = encode(&buffer, &EncodeRequest::new("image/jpeg", 0.8)).unwrap();
//! println!("Encoded {} bytes", jpeg.len());
//! ```

mod jpeg;
mod png;
mod webp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::format::ImageFormat;

pub use jpeg::{jpeg_quality, JpegEncoder};
pub use png::PngEncoder;
pub use webp::WebPEncoder;

/// Errors that can occur during encoding. Both are terminal.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No encoder exists for the requested output.
    #[error("Unsupported output format: {0}")]
    Unsupported(String),

    /// The codec itself failed.
    #[error("Encoder failure: {0}")]
    EncoderFailure(String),
}

/// Output MIME type and quality for a single encode call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeRequest {
    /// Output MIME type, e.g. `image/jpeg`.
    pub mime_hint: String,
    /// Quality in `[0, 1]`; ignored by lossless codecs.
    pub quality: f32,
}

impl EncodeRequest {
    pub fn new(mime_hint: impl Into<String>, quality: f32) -> Self {
        Self {
            mime_hint: mime_hint.into(),
            quality,
        }
    }
}

/// Capability interface implemented once per output codec.
///
/// Implementations must be deterministic for a given `(buffer, quality)`.
pub trait Encoder: Sync {
    /// The format this encoder writes.
    fn format(&self) -> ImageFormat;

    /// Whether `quality` is ignored.
    fn is_lossless(&self) -> bool;

    /// Encode `buffer` at `quality` in `[0, 1]`.
    fn encode(&self, buffer: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError>;
}

static JPEG: JpegEncoder = JpegEncoder;
static PNG: PngEncoder = PngEncoder;
static WEBP: WebPEncoder = WebPEncoder;

/// Look up the encoder for a format, if we can write it.
pub fn encoder_for(format: ImageFormat) -> Option<&'static dyn Encoder> {
    match format {
        ImageFormat::Jpeg => Some(&JPEG),
        ImageFormat::Png => Some(&PNG),
        ImageFormat::WebP => Some(&WEBP),
        ImageFormat::Gif | ImageFormat::Bmp | ImageFormat::Tiff => None,
    }
}

/// Encode `buffer` as described by `request`.
///
/// # Errors
///
/// - `EncodeError::Unsupported` if the MIME hint is unknown or names a
///   format without an encoder
/// - `EncodeError::EncoderFailure` if the codec fails
pub fn encode(buffer: &PixelBuffer, request: &EncodeRequest) -> Result<Vec<u8>, EncodeError> {
    let encoder = ImageFormat::from_mime(&request.mime_hint)
        .and_then(encoder_for)
        .ok_or_else(|| EncodeError::Unsupported(request.mime_hint.clone()))?;
    encoder.encode(buffer, request.quality)
}

/// Map any `Display` error from a codec into [`EncodeError::EncoderFailure`].
pub(crate) fn failure(err: impl std::fmt::Display) -> EncodeError {
    EncodeError::EncoderFailure(err.to_string())
}
