//! Request, configuration and result types for the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{DecodeError, DecodeLimits};
use crate::encode::EncodeError;
use crate::format::ImageFormat;
use crate::resample::{ResampleError, ResampleFilter, ResampleOptions, DEFAULT_MAX_DIMENSION};
use crate::search::{SizeTarget, SizeTargetError, SizeTargetMissed};

/// Pipeline-wide settings. Every field has a default, so a partial object
/// deserializes cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Filter used for each resampling step.
    pub filter: ResampleFilter,
    /// Largest output edge in pixels.
    pub max_dimension: u32,
    /// Output format; `None` keeps the source format.
    pub output_format: Option<ImageFormat>,
    /// Ceilings applied while decoding the source.
    pub decode_limits: DecodeLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter: ResampleFilter::default(),
            max_dimension: DEFAULT_MAX_DIMENSION,
            output_format: None,
            decode_limits: DecodeLimits::default(),
        }
    }
}

impl PipelineConfig {
    pub fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            filter: self.filter,
            max_dimension: self.max_dimension,
        }
    }
}

/// Output dimensions of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputSize {
    /// Keep the source dimensions.
    Source,
    /// Exact width and height, regardless of source aspect ratio.
    Exact { width: u32, height: u32 },
    /// Multiply both source dimensions by a factor.
    Scale(f32),
}

/// How the encoder's quality is chosen. Never inferred; the caller picks one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Encode once at this quality in `[0, 1]`.
    FixedQuality(f32),
    /// Search for the quality that meets a byte size.
    TargetByteSize(SizeTarget),
}

/// One pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    pub size: OutputSize,
    pub mode: Mode,
}

impl PipelineRequest {
    pub fn new(size: OutputSize, mode: Mode) -> Self {
        Self { size, mode }
    }
}

/// Observable state of a [`super::Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineStage {
    #[default]
    Idle,
    Decoding,
    Resampling,
    Encoding,
    SearchingQuality,
    Done,
    Failed,
}

/// The terminal value of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    /// Encoded output.
    pub bytes: Vec<u8>,
    /// `bytes.len()`.
    pub achieved_bytes: u64,
    /// Quality passed to the encoder for `bytes`.
    pub quality_used: f32,
    /// Output `(width, height)`.
    pub dimensions: (u32, u32),
    /// Output format.
    pub format: ImageFormat,
    /// Set when a byte-size target could not be met; the output is still valid.
    pub warning: Option<SizeTargetMissed>,
}

impl EncodeResult {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Terminal failure of a pipeline run. No partial output accompanies it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Resample failed: {0}")]
    Resample(#[from] ResampleError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Invalid size target: {0}")]
    InvalidSizeTarget(#[from] SizeTargetError),

    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(f32),

    #[error("Pipeline cancelled")]
    Cancelled,
}

/// Cooperative cancellation shared between the caller and a running pipeline.
///
/// Checked at stage boundaries, between resample steps and before every
/// search iteration. A codec call already in flight finishes, and its
/// result is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_dimension, 8000);
        assert_eq!(config.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.output_format, None);
        assert_eq!(config.resample_options(), ResampleOptions::default());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(token.check().is_ok());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_pipeline_error_wraps_stage_errors() {
        let err: PipelineError = ResampleError::InvalidDimensions { width: 0, height: 1 }.into();
        assert_eq!(
            err.to_string(),
            "Resample failed: Invalid dimensions: 0x1 (both must be non-zero)"
        );

        let err: PipelineError = DecodeError::Truncated.into();
        assert!(matches!(err, PipelineError::Decode(DecodeError::Truncated)));
    }
}
