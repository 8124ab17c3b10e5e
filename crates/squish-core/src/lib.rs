//! Squish Core - size-constrained image re-encoding
//!
//! This crate decodes an encoded raster, resizes it progressively to an exact
//! size, and re-encodes it either at a fixed quality or at the quality whose
//! output lands closest to a byte budget.
//!
//! # Module Structure
//!
//! - `decode` - encoded bytes to an RGBA [`PixelBuffer`]
//! - `resample` - bounded-step resizing via [`ScalePlan`]
//! - `encode` - [`Encoder`] implementations for JPEG, PNG and WebP
//! - `search` - binary search of quality against a [`SizeTarget`]
//! - `pipeline` - the orchestrator and its entry points

pub mod buffer;
pub mod decode;
pub mod encode;
pub mod format;
pub mod pipeline;
pub mod progress;
pub mod resample;
pub mod search;

#[cfg(test)]
mod test_support;

pub use buffer::PixelBuffer;
pub use decode::{decode, DecodeError, DecodeLimits, Decoder};
pub use encode::{encode, EncodeError, EncodeRequest, Encoder};
pub use format::ImageFormat;
pub use pipeline::{
    compress_to_byte_size, resize_to_dimensions, scale_by_factor, CancelToken, EncodeResult,
    Mode, OutputSize, Pipeline, PipelineConfig, PipelineError, PipelineRequest, PipelineStage,
};
pub use resample::{resample, ResampleError, ResampleFilter, ResampleOptions, ScalePlan};
pub use search::{search_quality, SearchOutcome, SizeTarget, SizeTargetError, SizeTargetMissed};
