//! Squish WASM - WebAssembly bindings for the squish re-encoding pipeline
//!
//! This crate exposes the squish-core entry points to JavaScript/TypeScript
//! applications, typically from inside a Web Worker.
//!
//! # Module Structure
//!
//! - `pipeline` - resize, compress-to-size and scale bindings
//! - `types` - WASM-compatible wrapper for pipeline results
//! - `logger` - console sink for the core's `log` output
//!
//! # Usage
//!
//! ```typescript
//! import init, { resize_to_dimensions, init_logging } from '@squish/wasm';
//!
//! await init();
//! init_logging("debug");
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = resize_to_dimensions(bytes, file.type, 800, 600, 0.85);
//! console.log(`${result.width}x${result.height}, ${result.achievedBytes} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod logger;
mod pipeline;
mod types;

pub use logger::init_logging;
pub use pipeline::{compress_to_byte_size, resize_to_dimensions, run_pipeline, scale_by_factor};
pub use types::JsEncodeResult;

/// Initialize the WASM module (called automatically on load).
///
/// Installs the console logger at `warn`, so missed size targets show up
/// without any setup.
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Warn);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
