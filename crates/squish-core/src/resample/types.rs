//! Core types for resampling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest output edge the resampler will allocate for, in pixels.
///
/// An RGBA8 buffer at 8000x8000 is roughly 256 MB.
pub const DEFAULT_MAX_DIMENSION: u32 = 8000;

/// Error types for resampling operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    /// Width or height is zero.
    #[error("Invalid dimensions: {width}x{height} (both must be non-zero)")]
    InvalidDimensions { width: u32, height: u32 },

    /// The requested output exceeds the dimension ceiling.
    #[error("Requested size {width}x{height} exceeds the {max}px limit")]
    DimensionTooLarge { width: u32, height: u32, max: u32 },
}

/// Separable filter applied on every resampling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResampleFilter {
    /// Bilinear (triangle) filter; fast, slightly soft.
    Bilinear,
    /// Catmull-Rom bicubic filter.
    CatmullRom,
    /// Lanczos windowed sinc with a = 3; sharpest.
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ResampleFilter::Bilinear => image::imageops::FilterType::Triangle,
            ResampleFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Options for [`super::resample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResampleOptions {
    pub filter: ResampleFilter,
    pub max_dimension: u32,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            filter: ResampleFilter::default(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            ResampleFilter::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            ResampleFilter::CatmullRom.to_image_filter(),
            image::imageops::FilterType::CatmullRom
        ));
        assert!(matches!(
            ResampleFilter::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_resample_error_display() {
        let err = ResampleError::DimensionTooLarge {
            width: 10000,
            height: 600,
            max: 8000,
        };
        assert_eq!(
            err.to_string(),
            "Requested size 10000x600 exceeds the 8000px limit"
        );
    }
}
