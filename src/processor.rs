//! Caller-facing filter API.
//!
//! An [`ImageProcessor`] owns a shared registry handle and the thread count
//! for the calls made through it. The thread count is read once per call;
//! running a non-partitionable filter never changes it.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::executor::{draw_cut_lines, Execution, ParallelExecutor};
use crate::filters::FilterRegistry;
use crate::image::Image;

#[derive(Debug, Clone)]
pub struct ImageProcessor {
    executor: ParallelExecutor,
    thread_count: usize,
}

impl ImageProcessor {
    pub fn new(registry: Arc<FilterRegistry>, thread_count: usize) -> Self {
        Self {
            executor: ParallelExecutor::new(registry),
            thread_count,
        }
    }

    pub fn from_config(registry: Arc<FilterRegistry>, config: &ProcessorConfig) -> Self {
        Self::new(registry, config.threads)
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Values below 1 behave like 1.
    pub fn set_thread_count(&mut self, thread_count: usize) {
        self.thread_count = thread_count;
    }

    pub fn executor(&self) -> &ParallelExecutor {
        &self.executor
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        self.executor.registry()
    }

    pub fn apply_filter(&self, name: &str, image: &Image) -> Result<Image> {
        self.apply_filter_timed(name, image).map(|(out, _)| out)
    }

    /// Filtered image plus elapsed microseconds.
    pub fn apply_filter_timed(&self, name: &str, image: &Image) -> Result<(Image, u64)> {
        self.executor.execute(name, image, self.thread_count)
    }

    /// Filtered image with every band boundary marked by a yellow line.
    pub fn apply_filter_with_cut_lines(&self, name: &str, image: &Image) -> Result<Image> {
        let Execution {
            image: filtered,
            segments,
            ..
        } = self.executor.run(name, image, self.thread_count)?;
        Ok(draw_cut_lines(&filtered, &segments))
    }

    /// Run every partitionable filter in the registry with cut lines drawn.
    ///
    /// Stops at the first failing filter.
    pub fn apply_all_with_cut_lines(&self, image: &Image) -> Result<BTreeMap<String, Image>> {
        if image.is_empty() {
            return Err(Error::InvalidInput("empty image".to_string()));
        }
        let registry = self.registry();
        let mut results = BTreeMap::new();
        for name in registry.names() {
            if !registry.lookup(name)?.partitionable() {
                debug!("{name}: skipped for cut lines, not partitionable");
                continue;
            }
            results.insert(name.to_string(), self.apply_filter_with_cut_lines(name, image)?);
        }
        Ok(results)
    }
}
