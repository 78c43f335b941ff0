//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA bytes; results are always RGBA too, so
//! single-channel filter output (edges, spectra) comes back as opaque gray.
//!
//! Without wasm threads a thread pool cannot be built, so pass `threads = 1`
//! unless the module was compiled with atomics.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::filters::FilterRegistry;
use crate::image::Image;
use crate::processor::ImageProcessor;

fn to_js_err(err: crate::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Apply a builtin filter to an RGBA image.
///
/// # Arguments
/// * `name` - Filter name, e.g. "gaussian"
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `threads` - Number of row bands
///
/// # Returns
/// Flat array of RGBA bytes. Filters that change geometry (resize, rotate,
/// fourier) return a different size; query it with `output_size_wasm`.
#[wasm_bindgen]
pub fn apply_filter_wasm(
    name: &str,
    data: &[u8],
    width: usize,
    height: usize,
    threads: usize,
) -> Result<Vec<u8>, JsValue> {
    let input = Image::from_raw(height, width, 4, data.to_vec()).map_err(to_js_err)?;
    let processor = ImageProcessor::new(Arc::new(FilterRegistry::with_builtins()), threads);
    let result = processor.apply_filter(name, &input).map_err(to_js_err)?;

    let rgba = result
        .to_channels(4)
        .ok_or_else(|| JsValue::from_str("filter output has no RGBA form"))?;
    Ok(rgba.into_raw())
}

/// `[height, width]` of the filter output for an input of the given size.
#[wasm_bindgen]
pub fn output_size_wasm(name: &str, width: usize, height: usize) -> Result<Vec<u32>, JsValue> {
    let input = Image::zeros(height, width, 4);
    let processor = ImageProcessor::new(Arc::new(FilterRegistry::with_builtins()), 1);
    let result = processor.apply_filter(name, &input).map_err(to_js_err)?;
    Ok(vec![result.height() as u32, result.width() as u32])
}

/// Names of the builtin filters.
#[wasm_bindgen]
pub fn filter_names_wasm() -> Vec<String> {
    FilterRegistry::with_builtins()
        .names()
        .map(str::to_string)
        .collect()
}
