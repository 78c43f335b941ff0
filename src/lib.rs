//! rowband
//!
//! Row-band parallel execution of image filters. A filter call is split into
//! horizontal bands, each band is padded with the rows its neighborhood
//! needs, the bands run concurrently, and the cropped results are written
//! into one output buffer. For partitionable deterministic filters the
//! output is identical for every thread count.
//!
//! ## Image Format
//! Filters take `u8` images of shape (height, width, channels):
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! ## Components
//! - [`FilterRegistry`] - filter name to primitive plus partition policy
//! - [`executor::plan_segments`] - core and overlap-extended row bands
//! - [`ParallelExecutor`] - runs one call over the bands and merges them
//! - [`ImageProcessor`] - caller-facing API owning the thread count
//! - [`BenchmarkHarness`] - thread-count sweeps and their summaries
//!
//! ```
//! use std::sync::Arc;
//! use rowband::{FilterRegistry, Image, ImageProcessor};
//!
//! let processor = ImageProcessor::new(Arc::new(FilterRegistry::with_builtins()), 4);
//! let frame = Image::from_fn(64, 48, 3, |y, x, c| (y + x + c) as u8);
//! let (blurred, micros) = processor.apply_filter_timed("gaussian", &frame)?;
//! assert_eq!(blurred.height(), 64);
//! # let _ = micros;
//! # Ok::<(), rowband::Error>(())
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod executor;
pub mod filters;
pub mod image;
pub mod processor;
pub mod sink;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use benchmark::{BenchmarkHarness, BenchmarkResult, BenchmarkResults, HarnessState, Summary};
pub use error::{Error, PrimitiveError, Result};
pub use executor::{ParallelExecutor, Segment};
pub use filters::{BuiltinFilter, FilterRegistry, FilterSpec, OutputChannels, Primitive};
pub use image::Image;
pub use processor::ImageProcessor;
pub use sink::FrameSink;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::collections::BTreeMap;
    use std::sync::{Arc, OnceLock};

    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::{BenchmarkHarness, Error, FilterRegistry, Image, ImageProcessor};

    static REGISTRY: OnceLock<Arc<FilterRegistry>> = OnceLock::new();

    fn registry() -> Arc<FilterRegistry> {
        REGISTRY
            .get_or_init(|| Arc::new(FilterRegistry::with_builtins()))
            .clone()
    }

    fn to_py_err(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Apply a builtin filter with `threads` row bands.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels), u8
    /// * `name` - Filter name, e.g. "gaussian"
    /// * `threads` - Number of bands (default: 4)
    #[pyfunction]
    #[pyo3(signature = (image, name, threads=4))]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
        threads: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = Image::new(image.as_array().to_owned());
        let processor = ImageProcessor::new(registry(), threads);
        let result = py
            .allow_threads(|| processor.apply_filter(name, &input))
            .map_err(to_py_err)?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Like `apply_filter`, also returning the elapsed microseconds.
    #[pyfunction]
    #[pyo3(signature = (image, name, threads=4))]
    pub fn apply_filter_timed<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
        threads: usize,
    ) -> PyResult<(Bound<'py, PyArray3<u8>>, u64)> {
        let input = Image::new(image.as_array().to_owned());
        let processor = ImageProcessor::new(registry(), threads);
        let (result, micros) = py
            .allow_threads(|| processor.apply_filter_timed(name, &input))
            .map_err(to_py_err)?;
        Ok((result.into_array().into_pyarray(py), micros))
    }

    /// Names of the builtin filters.
    #[pyfunction]
    pub fn filter_names() -> Vec<String> {
        registry().names().map(str::to_string).collect()
    }

    /// Benchmark filters over a thread range.
    ///
    /// # Returns
    /// Dict of filter name to a list of `(threads, mean_microseconds)`.
    #[pyfunction]
    #[pyo3(signature = (image, filters, min_threads=1, max_threads=10, trials=3))]
    pub fn run_benchmark(
        py: Python<'_>,
        image: PyReadonlyArray3<'_, u8>,
        filters: Vec<String>,
        min_threads: usize,
        max_threads: usize,
        trials: usize,
    ) -> PyResult<BTreeMap<String, Vec<(usize, f64)>>> {
        let input = Image::new(image.as_array().to_owned());
        let harness = BenchmarkHarness::new(registry());
        let names: Vec<&str> = filters.iter().map(String::as_str).collect();
        let results = py
            .allow_threads(|| harness.run_benchmark(&input, &names, min_threads..=max_threads, trials))
            .map_err(to_py_err)?;
        Ok(results.to_map())
    }

    #[pymodule]
    pub fn rowband(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        m.add_function(wrap_pyfunction!(apply_filter_timed, m)?)?;
        m.add_function(wrap_pyfunction!(filter_names, m)?)?;
        m.add_function(wrap_pyfunction!(run_benchmark, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::rowband;
