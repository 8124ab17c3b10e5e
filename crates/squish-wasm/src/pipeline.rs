//! Pipeline WASM bindings.
//!
//! This module exposes the squish-core entry points to JavaScript. Every
//! function takes the encoded source bytes plus their declared MIME type and
//! returns a [`JsEncodeResult`].
//!
//! # Functions
//!
//! - [`resize_to_dimensions`] - exact-size resize at a fixed quality
//! - [`compress_to_byte_size`] - keep dimensions, search quality for a size
//! - [`scale_by_factor`] - multiply both dimensions by a factor
//! - [`run_pipeline`] - full control via config and request objects
//!
//! # Example
//!
//! ```typescript
//! import { compress_to_byte_size } from '@squish/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_byte_size(bytes, file.type, { targetBytes: 200_000 },
//!     (fraction) => bar.value = fraction);
//! if (result.targetMissed) console.warn(result.warning);
//! const blob = new Blob([result.bytes], { type: result.mimeType });
//! ```

use js_sys::Function;
use log::debug;
use squish_core::pipeline::{self, Pipeline, PipelineConfig, PipelineError, PipelineRequest};
use squish_core::{EncodeResult, SizeTarget};
use wasm_bindgen::prelude::*;

use crate::types::JsEncodeResult;

/// Resize to exactly `width` x `height` and encode at `quality` (0-1).
///
/// `progress`, if given, is called with fractions in `[0, 1]` that never
/// decrease and end at exactly `1`.
#[wasm_bindgen]
pub fn resize_to_dimensions(
    bytes: &[u8],
    mime: &str,
    width: u32,
    height: u32,
    quality: f32,
    progress: Option<Function>,
) -> Result<JsEncodeResult, JsValue> {
    finish(with_js_progress(progress.as_ref(), |progress| {
        pipeline::resize_to_dimensions(bytes, mime, width, height, quality, progress)
    }))
}

/// Keep the source dimensions and find the quality whose output is closest
/// to `target`.
///
/// `target` is `{ targetBytes, toleranceRatio?, minQuality?, maxQuality?,
/// maxIterations? }`. A missed target still returns an image, with
/// `targetMissed` set.
#[wasm_bindgen]
pub fn compress_to_byte_size(
    bytes: &[u8],
    mime: &str,
    target: JsValue,
    progress: Option<Function>,
) -> Result<JsEncodeResult, JsValue> {
    let target: SizeTarget = serde_wasm_bindgen::from_value(target).map_err(to_js_error)?;
    finish(with_js_progress(progress.as_ref(), |progress| {
        pipeline::compress_to_byte_size(bytes, mime, target, progress)
    }))
}

/// Multiply both source dimensions by `factor` and encode at `quality`.
#[wasm_bindgen]
pub fn scale_by_factor(
    bytes: &[u8],
    mime: &str,
    factor: f32,
    quality: f32,
    progress: Option<Function>,
) -> Result<JsEncodeResult, JsValue> {
    finish(with_js_progress(progress.as_ref(), |progress| {
        pipeline::scale_by_factor(bytes, mime, factor, quality, progress)
    }))
}

/// Run with an explicit configuration and request.
///
/// `config` may be partial or `undefined`, e.g. `{ filter: "catmullRom",
/// outputFormat: "webp" }`. `request` is `{ size, mode }` where `size` is
/// `"source"`, `{ exact: { width, height } }` or `{ scale: 2 }`, and `mode`
/// is `{ fixedQuality: 0.8 }` or `{ targetByteSize: { targetBytes } }`.
#[wasm_bindgen]
pub fn run_pipeline(
    bytes: &[u8],
    mime: &str,
    config: JsValue,
    request: JsValue,
    progress: Option<Function>,
) -> Result<JsEncodeResult, JsValue> {
    let config: PipelineConfig = if config.is_undefined() || config.is_null() {
        PipelineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
    };
    let request: PipelineRequest = serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;

    finish(with_js_progress(progress.as_ref(), |progress| {
        run_configured(config, bytes, mime, &request, progress)
    }))
}

pub(crate) fn run_configured(
    config: PipelineConfig,
    bytes: &[u8],
    mime: &str,
    request: &PipelineRequest,
    progress: Option<&mut dyn FnMut(f32)>,
) -> Result<EncodeResult, PipelineError> {
    let mut pipeline = Pipeline::new(config);
    if let Some(callback) = progress {
        pipeline = pipeline.with_progress(callback);
    }
    pipeline.run(bytes, mime, request)
}

/// Adapt an optional JS callback to the core's progress parameter.
///
/// Exceptions thrown by the callback are logged and otherwise ignored.
fn with_js_progress<T>(
    progress: Option<&Function>,
    run: impl FnOnce(Option<&mut dyn FnMut(f32)>) -> T,
) -> T {
    match progress {
        Some(function) => {
            let mut forward = |fraction: f32| {
                if let Err(err) = function.call1(&JsValue::NULL, &JsValue::from_f64(f64::from(fraction))) {
                    debug!("progress callback threw: {err:?}");
                }
            };
            run(Some(&mut forward))
        }
        None => run(None),
    }
}

fn finish(result: Result<EncodeResult, PipelineError>) -> Result<JsEncodeResult, JsValue> {
    result.map(JsEncodeResult::from).map_err(to_js_error)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
