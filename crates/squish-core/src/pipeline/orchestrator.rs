//! The decode → resample → encode-or-search state machine.

use log::{debug, warn};

use super::types::{
    CancelToken, EncodeResult, Mode, OutputSize, PipelineConfig, PipelineError, PipelineRequest,
    PipelineStage,
};
use crate::buffer::PixelBuffer;
use crate::decode::decode_source;
use crate::encode::{encoder_for, EncodeError, Encoder};
use crate::format::ImageFormat;
use crate::progress::{Progress, DECODE_END, ENCODE_END, RESAMPLE_END};
use crate::resample::{check_dimensions, resample_step, ScalePlan};
use crate::search::{search_quality, SizeTarget, SizeTargetMissed};

/// A single-use, single-threaded pipeline run.
///
/// Owns every intermediate buffer exclusively. On failure those buffers are
/// dropped and only the error is returned.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    progress: Progress<'a>,
    cancel: CancelToken,
    stage: PipelineStage,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            progress: Progress::new(None),
            cancel: CancelToken::default(),
            stage: PipelineStage::Idle,
        }
    }

    /// Receive fractional progress in `[0, 1]`, non-decreasing, ending at `1.0`.
    pub fn with_progress(mut self, callback: &'a mut dyn FnMut(f32)) -> Self {
        self.progress = Progress::new(Some(callback));
        self
    }

    /// Abort the run when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Run the pipeline on `source`.
    pub fn run(
        &mut self,
        source: &[u8],
        declared_mime: &str,
        request: &PipelineRequest,
    ) -> Result<EncodeResult, PipelineError> {
        match self.execute(source, declared_mime, request) {
            Ok(result) => {
                self.enter(PipelineStage::Done);
                self.progress.finish();
                Ok(result)
            }
            Err(err) => {
                self.enter(PipelineStage::Failed);
                debug!("pipeline failed at progress {:.2}: {err}", self.progress.last());
                Err(err)
            }
        }
    }

    fn execute(
        &mut self,
        source: &[u8],
        declared_mime: &str,
        request: &PipelineRequest,
    ) -> Result<EncodeResult, PipelineError> {
        self.validate(request)?;

        self.cancel.check()?;
        self.enter(PipelineStage::Decoding);
        self.progress.report(0.0);
        let (source_format, buffer) =
            decode_source(source, declared_mime, &self.config.decode_limits)?;
        self.progress.report(DECODE_END);

        let (width, height) = self.output_dimensions(&buffer, request.size)?;
        let buffer = self.resample(buffer, width, height)?;
        self.progress.report(RESAMPLE_END);

        let encoder = self.pick_encoder(source_format, &request.mode)?;
        match request.mode {
            Mode::FixedQuality(quality) => self.encode_fixed(buffer, encoder, quality),
            Mode::TargetByteSize(target) => self.encode_to_size(buffer, encoder, &target),
        }
    }

    /// Checks that need no pixels, done before the source is decoded.
    fn validate(&self, request: &PipelineRequest) -> Result<(), PipelineError> {
        match request.size {
            OutputSize::Source => {}
            OutputSize::Exact { width, height } => {
                check_dimensions(width, height, self.config.max_dimension)?
            }
            OutputSize::Scale(factor) => {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(PipelineError::InvalidScaleFactor(factor));
                }
            }
        }
        if let Mode::TargetByteSize(target) = &request.mode {
            target.validate()?;
        }
        Ok(())
    }

    fn output_dimensions(
        &self,
        buffer: &PixelBuffer,
        size: OutputSize,
    ) -> Result<(u32, u32), PipelineError> {
        let dimensions = match size {
            OutputSize::Source => return Ok(buffer.dimensions()),
            OutputSize::Exact { width, height } => (width, height),
            OutputSize::Scale(factor) => scaled_dimensions(buffer.dimensions(), factor),
        };
        check_dimensions(dimensions.0, dimensions.1, self.config.max_dimension)?;
        Ok(dimensions)
    }

    fn resample(
        &mut self,
        buffer: PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, PipelineError> {
        if buffer.dimensions() == (width, height) {
            return Ok(buffer);
        }

        self.enter(PipelineStage::Resampling);
        let plan = ScalePlan::new(buffer.dimensions(), (width, height))?;
        let total = plan.len() as u32;

        let mut current = buffer;
        for (done, &size) in plan.steps().iter().enumerate() {
            self.cancel.check()?;
            current = resample_step(current, size, self.config.filter)?;
            self.progress
                .report_within(DECODE_END, RESAMPLE_END, done as u32 + 1, total);
        }
        Ok(current)
    }

    /// The configured output format, else the source format, else a
    /// fallback.
    ///
    /// Without a configured format, a size-targeted run needs a lossy
    /// encoder to search over, so lossless or unwritable sources go to JPEG.
    /// Fixed-quality runs of unwritable sources go to PNG.
    fn pick_encoder(
        &self,
        source_format: ImageFormat,
        mode: &Mode,
    ) -> Result<&'static dyn Encoder, PipelineError> {
        if let Some(format) = self.config.output_format {
            return encoder_for(format)
                .ok_or_else(|| EncodeError::Unsupported(format.mime_type().to_string()).into());
        }

        let fallback = match (encoder_for(source_format), mode) {
            (Some(encoder), Mode::FixedQuality(_)) => return Ok(encoder),
            (Some(encoder), Mode::TargetByteSize(_)) if !encoder.is_lossless() => {
                return Ok(encoder)
            }
            (_, Mode::FixedQuality(_)) => ImageFormat::Png,
            (_, Mode::TargetByteSize(_)) => ImageFormat::Jpeg,
        };
        debug!("{source_format} output unusable for this request; writing {fallback}");
        encoder_for(fallback)
            .ok_or_else(|| EncodeError::Unsupported(fallback.mime_type().to_string()).into())
    }

    fn encode_fixed(
        &mut self,
        buffer: PixelBuffer,
        encoder: &dyn Encoder,
        quality: f32,
    ) -> Result<EncodeResult, PipelineError> {
        self.cancel.check()?;
        self.enter(PipelineStage::Encoding);
        let quality = if quality.is_nan() { 1.0 } else { quality.clamp(0.0, 1.0) };
        let bytes = encoder.encode(&buffer, quality)?;
        self.progress.report(ENCODE_END);

        Ok(EncodeResult {
            achieved_bytes: bytes.len() as u64,
            bytes,
            quality_used: quality,
            dimensions: buffer.dimensions(),
            format: encoder.format(),
            warning: None,
        })
    }

    fn encode_to_size(
        &mut self,
        buffer: PixelBuffer,
        encoder: &dyn Encoder,
        target: &SizeTarget,
    ) -> Result<EncodeResult, PipelineError> {
        self.cancel.check()?;
        self.enter(PipelineStage::SearchingQuality);

        let (bytes, quality, warning) = if encoder.is_lossless() {
            // Only reached with an explicit lossless output format.
            let bytes = encoder.encode(&buffer, target.max_quality)?;
            let warning = (!target.accepts(bytes.len() as u64)).then(|| SizeTargetMissed {
                achieved_bytes: bytes.len() as u64,
                target_bytes: target.target_bytes,
            });
            (bytes, target.max_quality, warning)
        } else {
            let progress = &mut self.progress;
            let cancel = &self.cancel;
            let mut done = 0;
            let outcome = search_quality(target, |quality| {
                cancel.check()?;
                let bytes = encoder.encode(&buffer, quality)?;
                done += 1;
                progress.report_within(RESAMPLE_END, ENCODE_END, done, target.max_iterations);
                Ok::<_, PipelineError>(bytes)
            })?;
            let warning = outcome.missed(target);
            (outcome.bytes, outcome.quality, warning)
        };

        if let Some(missed) = &warning {
            warn!("{missed}");
        }
        self.progress.report(ENCODE_END);

        Ok(EncodeResult {
            achieved_bytes: bytes.len() as u64,
            bytes,
            quality_used: quality,
            dimensions: buffer.dimensions(),
            format: encoder.format(),
            warning,
        })
    }

    fn enter(&mut self, stage: PipelineStage) {
        debug!("pipeline stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}

/// Multiply both axes by `factor`, rounding, never below one pixel.
pub fn scaled_dimensions((width, height): (u32, u32), factor: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * factor as f64).round().max(1.0)).min(u32::MAX as f64) as u32;
    (scale(width), scale(height))
}
