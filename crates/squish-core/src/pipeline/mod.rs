//! End-to-end re-encoding: decode, resample, then encode at a fixed quality
//! or search for a byte size.
//!
//! This module provides:
//! - [`Pipeline`], the configurable state machine behind every run
//! - [`resize_to_dimensions`], [`compress_to_byte_size`] and
//!   [`scale_by_factor`], the entry points for the common requests
//!
//! # Examples
//!
//! ```ignore
//! use squish_core::pipeline::{compress_to_byte_size, resize_to_dimensions};
//! use squish_core::search::SizeTarget;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let thumb = resize_to_dimensions(&bytes, "image/jpeg", 800, 600, 0.8, None).unwrap();
//!
//! let mut report = |fraction: f32| println!("{:.0}%", fraction * 100.0);
//! let small = compress_to_byte_size(&bytes, "image/jpeg", SizeTarget::new(200_000), Some(&mut report)).unwrap();
//! if let Some(warning) = small.warning {
//!     eprintln!("{warning}");
//! }
//! ```

mod orchestrator;
mod types;

pub use orchestrator::{scaled_dimensions, Pipeline};
pub use types::{
    CancelToken, EncodeResult, Mode, OutputSize, PipelineConfig, PipelineError, PipelineRequest,
    PipelineStage,
};

use crate::search::SizeTarget;

/// Resize to exactly `target_width` x `target_height` and encode at `quality`.
///
/// # Errors
///
/// Oversized or zero dimensions fail with `PipelineError::Resample` before
/// `source` is decoded.
pub fn resize_to_dimensions(
    source: &[u8],
    declared_mime: &str,
    target_width: u32,
    target_height: u32,
    quality: f32,
    progress: Option<&mut dyn FnMut(f32)>,
) -> Result<EncodeResult, PipelineError> {
    let request = PipelineRequest::new(
        OutputSize::Exact {
            width: target_width,
            height: target_height,
        },
        Mode::FixedQuality(quality),
    );
    run_default(source, declared_mime, &request, progress)
}

/// Keep the source dimensions and search for the quality closest to
/// `size_target`.
///
/// A missed target is not an error; the closest candidate is returned with
/// [`EncodeResult::warning`] set.
pub fn compress_to_byte_size(
    source: &[u8],
    declared_mime: &str,
    size_target: SizeTarget,
    progress: Option<&mut dyn FnMut(f32)>,
) -> Result<EncodeResult, PipelineError> {
    let request = PipelineRequest::new(OutputSize::Source, Mode::TargetByteSize(size_target));
    run_default(source, declared_mime, &request, progress)
}

/// Multiply both source dimensions by `factor` and encode at `quality`.
pub fn scale_by_factor(
    source: &[u8],
    declared_mime: &str,
    factor: f32,
    quality: f32,
    progress: Option<&mut dyn FnMut(f32)>,
) -> Result<EncodeResult, PipelineError> {
    let request = PipelineRequest::new(OutputSize::Scale(factor), Mode::FixedQuality(quality));
    run_default(source, declared_mime, &request, progress)
}

fn run_default(
    source: &[u8],
    declared_mime: &str,
    request: &PipelineRequest,
    progress: Option<&mut dyn FnMut(f32)>,
) -> Result<EncodeResult, PipelineError> {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    if let Some(callback) = progress {
        pipeline = pipeline.with_progress(callback);
    }
    pipeline.run(source, declared_mime, request)
}
