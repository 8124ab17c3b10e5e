//! Raster formats understood by the pipeline.
//!
//! Callers hand us a declared MIME string alongside the bytes. Browsers derive
//! that string from the file extension, so it is a hint rather than a fact:
//! [`ImageFormat::sniff`] inspects the magic bytes when the hint is missing
//! or contradicted by the content.

use serde::{Deserialize, Serialize};

/// A raster format the pipeline can decode (and for some, encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Baseline/progressive JPEG. The only lossy output format.
    Jpeg,
    /// PNG, any bit depth or color type.
    Png,
    /// WebP, lossy or lossless on input; lossless on output.
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Windows bitmap.
    Bmp,
    /// TIFF (baseline).
    Tiff,
}

impl ImageFormat {
    /// All formats, in registry order.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::WebP,
        ImageFormat::Gif,
        ImageFormat::Bmp,
        ImageFormat::Tiff,
    ];

    /// Parse a MIME type such as `image/jpeg` or `image/png; q=1`.
    ///
    /// Matching is case-insensitive, ignores parameters after `;`, and accepts
    /// the non-standard aliases browsers still emit (`image/jpg`,
    /// `image/pjpeg`, `image/x-ms-bmp`, `image/tif`).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        let essence = essence.to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/png" | "image/apng" => Some(ImageFormat::Png),
            "image/webp" => Some(ImageFormat::WebP),
            "image/gif" => Some(ImageFormat::Gif),
            "image/bmp" | "image/x-ms-bmp" | "image/x-bmp" => Some(ImageFormat::Bmp),
            "image/tiff" | "image/tif" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Detect the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        image::guess_format(bytes).ok().and_then(Self::from_image_format)
    }

    /// Canonical MIME type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }

    /// Whether the encoder for this format discards information depending on
    /// a quality parameter.
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }

    /// Convert to the image crate's format tag.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// Convert from the image crate's format tag, if we support it.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
            image::ImageFormat::Tiff => Some(ImageFormat::Tiff),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}
