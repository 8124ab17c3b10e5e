//! Progressive resampling of RGBA buffers to an exact size.
//!
//! This module provides:
//! - [`ScalePlan`], the sequence of bounded intermediate sizes
//! - [`resample`], which walks a plan with a separable filter
//! - [`check_dimensions`], the up-front guard against invalid or oversized
//!   requests
//!
//! Every pass allocates a fresh buffer and drops the previous one, so peak
//! memory is two adjacent steps, never the whole chain.

mod plan;
mod types;

use image::imageops;
use log::debug;

use crate::buffer::PixelBuffer;

pub use plan::{ScalePlan, MAX_STEP_FACTOR, MIN_STEP_FACTOR};
pub use types::{ResampleError, ResampleFilter, ResampleOptions, DEFAULT_MAX_DIMENSION};

/// Validate a requested output size without allocating anything.
///
/// # Errors
///
/// - `ResampleError::InvalidDimensions` if either axis is zero
/// - `ResampleError::DimensionTooLarge` if either axis exceeds `max_dimension`
pub fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<(), ResampleError> {
    if width == 0 || height == 0 {
        return Err(ResampleError::InvalidDimensions { width, height });
    }
    if width.max(height) > max_dimension {
        return Err(ResampleError::DimensionTooLarge {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

/// Resize `buffer` to exactly `width` x `height`.
///
/// Equal dimensions return the buffer untouched; it is already normalized
/// RGBA. Otherwise the resize is split per [`ScalePlan`].
///
/// # Errors
///
/// See [`check_dimensions`].
pub fn resample(
    buffer: PixelBuffer,
    width: u32,
    height: u32,
    options: &ResampleOptions,
) -> Result<PixelBuffer, ResampleError> {
    check_dimensions(width, height, options.max_dimension)?;
    let plan = ScalePlan::new(buffer.dimensions(), (width, height))?;

    plan.steps()
        .iter()
        .try_fold(buffer, |current, &size| resample_step(current, size, options.filter))
}

/// Apply one pass of the filter, consuming the input buffer.
pub fn resample_step(
    buffer: PixelBuffer,
    (width, height): (u32, u32),
    filter: ResampleFilter,
) -> Result<PixelBuffer, ResampleError> {
    debug!(
        "resample step {}x{} -> {}x{} ({:?})",
        buffer.width(),
        buffer.height(),
        width,
        height,
        filter
    );
    let source = buffer.into_rgba_image();
    let resized = imageops::resize(&source, width, height, filter.to_image_filter());
    drop(source);

    PixelBuffer::from_rgba_image(resized).ok_or(ResampleError::InvalidDimensions { width, height })
}
