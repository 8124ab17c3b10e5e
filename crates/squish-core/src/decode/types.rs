//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
///
/// None of these are transient; the pipeline surfaces them without retrying.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Neither the declared MIME type nor the content identify a supported format.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The data ends before the image is complete.
    #[error("Image data is truncated")]
    Truncated,

    /// The data is structurally invalid.
    #[error("Corrupted image data: {0}")]
    Corrupt(String),

    /// The header declares an image larger than the configured limits.
    #[error("Image exceeds decode limits: {0}")]
    LimitsExceeded(String),
}

/// Resource ceilings applied while decoding untrusted input.
///
/// Checked against the header before the pixel buffer is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeLimits {
    /// Maximum source width in pixels.
    pub max_width: u32,
    /// Maximum source height in pixels.
    pub max_height: u32,
    /// Maximum bytes the decoder may allocate.
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 16_384,
            max_height: 16_384,
            max_alloc_bytes: 1 << 30,
        }
    }
}

impl DecodeLimits {
    /// Convert to the image crate's limits.
    pub fn to_image_limits(self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits.max_alloc = Some(self.max_alloc_bytes);
        limits
    }
}
