//! WASM-compatible wrapper types for pipeline results.
//!
//! This module provides JavaScript-friendly types that wrap the core squish
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use serde::Serialize;
use squish_core::EncodeResult;
use wasm_bindgen::prelude::*;

/// The output of a pipeline run, for JavaScript.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. Reading `bytes` copies them into a
/// JavaScript `Uint8Array`, so read it once and keep the array.
#[wasm_bindgen]
pub struct JsEncodeResult {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    achieved_bytes: u64,
    quality_used: f32,
    mime_type: &'static str,
    warning: Option<String>,
}

#[wasm_bindgen]
impl JsEncodeResult {
    /// Encoded output as a `Uint8Array` (copied).
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded size in bytes. A JS number, exact below 2^53.
    #[wasm_bindgen(getter, js_name = achievedBytes)]
    pub fn achieved_bytes(&self) -> f64 {
        self.achieved_bytes as f64
    }

    /// Quality in `[0, 1]` that produced `bytes`.
    #[wasm_bindgen(getter, js_name = qualityUsed)]
    pub fn quality_used(&self) -> f32 {
        self.quality_used
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.mime_type.to_string()
    }

    /// True when a byte-size target could not be met. The output is still
    /// a valid image.
    #[wasm_bindgen(getter, js_name = targetMissed)]
    pub fn target_missed(&self) -> bool {
        self.warning.is_some()
    }

    /// Human-readable warning, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn warning(&self) -> Option<String> {
        self.warning.clone()
    }

    /// Everything except the bytes, as a plain object for logging or
    /// posting to the main thread.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.to_summary()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Serializable metadata of a [`JsEncodeResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EncodeSummary {
    pub width: u32,
    pub height: u32,
    pub achieved_bytes: u64,
    pub quality_used: f32,
    pub mime_type: &'static str,
    pub warning: Option<String>,
}

impl JsEncodeResult {
    pub(crate) fn to_summary(&self) -> EncodeSummary {
        EncodeSummary {
            width: self.width,
            height: self.height,
            achieved_bytes: self.achieved_bytes,
            quality_used: self.quality_used,
            mime_type: self.mime_type,
            warning: self.warning.clone(),
        }
    }
}

impl From<EncodeResult> for JsEncodeResult {
    fn from(result: EncodeResult) -> Self {
        let (width, height) = result.dimensions;
        Self {
            mime_type: result.mime_type(),
            warning: result.warning.map(|w| w.to_string()),
            bytes: result.bytes,
            width,
            height,
            achieved_bytes: result.achieved_bytes,
            quality_used: result.quality_used,
        }
    }
}
