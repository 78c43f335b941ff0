//! Thread-count benchmark harness.
//!
//! For every filter the harness sweeps an inclusive range of thread counts,
//! runs a fixed number of timed trials per count and records the mean. Only
//! one run may be active per harness; a second caller gets
//! [`Error::BenchmarkBusy`] instead of waiting.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rowband::{BenchmarkHarness, FilterRegistry, Image};
//!
//! let harness = BenchmarkHarness::new(Arc::new(FilterRegistry::with_builtins()));
//! let frame = Image::zeros(480, 640, 3);
//! let results = harness.run_benchmark(&frame, &["gaussian", "sobel"], 1..=8, 3)?;
//! for series in results.iter() {
//!     if let Some(summary) = series.summary() {
//!         println!("{}: best with {} threads", series.filter_name, summary.best_thread_count);
//!     }
//! }
//! # Ok::<(), rowband::Error>(())
//! ```

pub mod summary;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::config::BenchmarkConfig;
use crate::error::{Error, Result};
use crate::executor::ParallelExecutor;
use crate::filters::geometry::resize_to_u8;
use crate::filters::FilterRegistry;
use crate::image::Image;
use crate::sink::{FrameSink, NullSink};
pub use summary::{speedups, summarize, Summary};

/// Timing of one (filter, thread count) point.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub filter_name: String,
    pub thread_count: usize,
    /// One duration per trial, microseconds.
    pub trial_durations: Vec<u64>,
    /// Arithmetic mean of `trial_durations`, microseconds.
    pub mean_duration: f64,
}

/// One filter's points, ordered by ascending thread count.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSeries {
    pub filter_name: String,
    pub points: Vec<BenchmarkResult>,
}

impl FilterSeries {
    pub fn summary(&self) -> Option<Summary> {
        summarize(&self.points)
    }

    pub fn speedups(&self) -> Vec<(usize, f64)> {
        speedups(&self.points)
    }
}

/// Series of a completed run, in the order the filters were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkResults {
    series: Vec<FilterSeries>,
}

impl BenchmarkResults {
    pub fn get(&self, filter_name: &str) -> Option<&FilterSeries> {
        self.series.iter().find(|s| s.filter_name == filter_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterSeries> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// `filter -> [(thread_count, mean_duration)]`.
    pub fn to_map(&self) -> BTreeMap<String, Vec<(usize, f64)>> {
        self.series
            .iter()
            .map(|s| {
                let points = s
                    .points
                    .iter()
                    .map(|p| (p.thread_count, p.mean_duration))
                    .collect();
                (s.filter_name.clone(), points)
            })
            .collect()
    }
}

/// One point of the execution-time-vs-image-size sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSweepPoint {
    pub height: usize,
    pub width: usize,
    pub trial_durations: Vec<u64>,
    pub mean_duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HarnessState {
    Idle,
    Running {
        filter: String,
        thread_count: usize,
        trial: usize,
    },
    Completed(BenchmarkResults),
}

pub struct BenchmarkHarness {
    executor: ParallelExecutor,
    state: Mutex<HarnessState>,
    sink: Arc<dyn FrameSink>,
}

impl BenchmarkHarness {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            executor: ParallelExecutor::new(registry),
            state: Mutex::new(HarnessState::Idle),
            sink: Arc::new(NullSink),
        }
    }

    /// Show each filter's first output on `sink` while it is benchmarked.
    ///
    /// Without a sink the harness uses [`NullSink`].
    pub fn with_sink(mut self, sink: Arc<dyn FrameSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn state(&self) -> HarnessState {
        self.lock_state().clone()
    }

    /// Results of the last completed run, if any.
    pub fn last_results(&self) -> Option<BenchmarkResults> {
        match &*self.lock_state() {
            HarnessState::Completed(results) => Some(results.clone()),
            _ => None,
        }
    }

    /// Time every filter at every thread count in `thread_range`.
    ///
    /// # Arguments
    /// * `image` - Input frame, reused for every trial
    /// * `filter_names` - Registered filters, benchmarked in this order
    /// * `thread_range` - Inclusive, ascending thread counts
    /// * `trials` - Timed executions per point, at least 1
    ///
    /// # Returns
    /// One series per filter with one point per thread count.
    pub fn run_benchmark(
        &self,
        image: &Image,
        filter_names: &[&str],
        thread_range: RangeInclusive<usize>,
        trials: usize,
    ) -> Result<BenchmarkResults> {
        if filter_names.is_empty() {
            return Err(Error::InvalidInput("no filters to benchmark".to_string()));
        }
        if trials == 0 {
            return Err(Error::InvalidInput("trials must be at least 1".to_string()));
        }
        if thread_range.is_empty() {
            return Err(Error::InvalidInput(format!(
                "empty thread range {}..={}",
                thread_range.start(),
                thread_range.end()
            )));
        }
        if image.is_empty() {
            return Err(Error::InvalidInput("empty image".to_string()));
        }
        for name in filter_names {
            self.executor.registry().lookup(name)?;
        }

        let mut guard = self.begin(filter_names[0], *thread_range.start())?;
        let mut series = Vec::with_capacity(filter_names.len());

        for &filter in filter_names {
            let mut points = Vec::new();
            for thread_count in thread_range.clone() {
                let mut trial_durations = Vec::with_capacity(trials);
                for trial in 0..trials {
                    self.set_running(filter, thread_count, trial);
                    let (output, elapsed) = self.executor.execute(filter, image, thread_count)?;
                    trial_durations.push(elapsed);

                    if points.is_empty() && trial == 0 {
                        guard.show(&format!("{filter} Feed"), &output);
                    }
                }
                let mean_duration = mean(&trial_durations);
                debug!("{filter} @ {thread_count} threads: {mean_duration:.1} us");
                points.push(BenchmarkResult {
                    filter_name: filter.to_string(),
                    thread_count,
                    trial_durations,
                    mean_duration,
                });
            }
            series.push(FilterSeries {
                filter_name: filter.to_string(),
                points,
            });
        }

        let results = BenchmarkResults { series };
        guard.complete(results.clone());
        Ok(results)
    }

    /// Run the filters, thread range and trial count from `config`.
    pub fn run_configured(&self, image: &Image, config: &BenchmarkConfig) -> Result<BenchmarkResults> {
        let names: Vec<&str> = config.filters.iter().map(String::as_str).collect();
        self.run_benchmark(image, &names, config.thread_range(), config.trials)
    }

    /// Time one filter on `image` rescaled to each of `heights`.
    ///
    /// Widths follow the aspect ratio of `image`. The harness state after
    /// the sweep is the state before it.
    pub fn run_size_sweep(
        &self,
        image: &Image,
        filter_name: &str,
        heights: &[usize],
        thread_count: usize,
        trials: usize,
    ) -> Result<Vec<SizeSweepPoint>> {
        if heights.is_empty() || heights.contains(&0) {
            return Err(Error::InvalidInput("heights must be non-empty and positive".to_string()));
        }
        if trials == 0 {
            return Err(Error::InvalidInput("trials must be at least 1".to_string()));
        }
        if image.is_empty() {
            return Err(Error::InvalidInput("empty image".to_string()));
        }
        self.executor.registry().lookup(filter_name)?;

        let _guard = self.begin(filter_name, thread_count)?;
        let aspect = image.width() as f64 / image.height() as f64;
        let mut points = Vec::with_capacity(heights.len());

        for &height in heights {
            let width = ((height as f64 * aspect).round() as usize).max(1);
            let scaled = Image::new(resize_to_u8(image.view(), height, width));

            let mut trial_durations = Vec::with_capacity(trials);
            for trial in 0..trials {
                self.set_running(filter_name, thread_count, trial);
                let (_, elapsed) = self.executor.execute(filter_name, &scaled, thread_count)?;
                trial_durations.push(elapsed);
            }
            let mean_duration = mean(&trial_durations);
            debug!("{filter_name} @ {height}x{width}: {mean_duration:.1} us");
            points.push(SizeSweepPoint {
                height,
                width,
                trial_durations,
                mean_duration,
            });
        }

        Ok(points)
    }

    /// [`run_size_sweep`](Self::run_size_sweep) over the heights in `config`,
    /// using its lowest thread count and its trial count.
    pub fn run_configured_size_sweep(
        &self,
        image: &Image,
        filter_name: &str,
        config: &BenchmarkConfig,
    ) -> Result<Vec<SizeSweepPoint>> {
        self.run_size_sweep(
            image,
            filter_name,
            &config.size_sweep_heights,
            config.min_threads,
            config.trials,
        )
    }

    fn lock_state(&self) -> MutexGuard<'_, HarnessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, filter: &str, thread_count: usize) -> Result<RunGuard<'_>> {
        let mut state = self.lock_state();
        if matches!(*state, HarnessState::Running { .. }) {
            return Err(Error::BenchmarkBusy);
        }
        let previous = std::mem::replace(
            &mut *state,
            HarnessState::Running {
                filter: filter.to_string(),
                thread_count,
                trial: 0,
            },
        );
        Ok(RunGuard {
            harness: self,
            restore: Some(previous),
            opened: Vec::new(),
        })
    }

    fn set_running(&self, filter: &str, thread_count: usize, trial: usize) {
        *self.lock_state() = HarnessState::Running {
            filter: filter.to_string(),
            thread_count,
            trial,
        };
    }
}

impl std::fmt::Debug for BenchmarkHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkHarness")
            .field("executor", &self.executor)
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

/// Holds the harness in `Running` for one run.
///
/// On drop, closes every frame the run opened and writes back `restore`:
/// the pre-run state on failure or panic, `Completed` after
/// [`complete`](RunGuard::complete).
struct RunGuard<'a> {
    harness: &'a BenchmarkHarness,
    restore: Option<HarnessState>,
    opened: Vec<String>,
}

impl RunGuard<'_> {
    fn show(&mut self, name: &str, image: &Image) {
        self.harness.sink.show(name, image);
        if !self.opened.iter().any(|n| n == name) {
            self.opened.push(name.to_string());
        }
    }

    fn complete(mut self, results: BenchmarkResults) {
        self.restore = Some(HarnessState::Completed(results));
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        for name in &self.opened {
            self.harness.sink.close(name);
        }
        if let Some(state) = self.restore.take() {
            *self.harness.lock_state() = state;
        }
    }
}

fn mean(durations: &[u64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().map(|&d| d as f64).sum::<f64>() / durations.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn harness() -> BenchmarkHarness {
        BenchmarkHarness::new(Arc::new(FilterRegistry::with_builtins()))
    }

    fn frame() -> Image {
        Image::from_fn(16, 12, 3, |y, x, c| ((y * 9 + x * 4 + c) % 256) as u8)
    }

    #[test]
    fn test_points_per_thread_count() {
        let h = harness();
        let results = h.run_benchmark(&frame(), &["greyscale", "sobel"], 1..=4, 2).unwrap();

        assert_eq!(results.len(), 2);
        let series = results.get("sobel").unwrap();
        let threads: Vec<_> = series.points.iter().map(|p| p.thread_count).collect();
        assert_eq!(threads, vec![1, 2, 3, 4]);
        assert!(series.points.iter().all(|p| p.trial_durations.len() == 2));

        let map = results.to_map();
        assert_eq!(map["greyscale"].len(), 4);
        assert_eq!(h.last_results(), Some(results));
    }

    #[test]
    fn test_invalid_arguments() {
        let h = harness();
        let img = frame();
        assert!(matches!(h.run_benchmark(&img, &[], 1..=2, 1), Err(Error::InvalidInput(_))));
        assert!(matches!(
            h.run_benchmark(&img, &["greyscale"], 1..=2, 0),
            Err(Error::InvalidInput(_))
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let descending = 3..=1;
        assert!(matches!(
            h.run_benchmark(&img, &["greyscale"], descending, 1),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            h.run_benchmark(&img, &["nope"], 1..=2, 1),
            Err(Error::UnknownFilter(_))
        ));
        assert_eq!(h.state(), HarnessState::Idle);
    }

    #[test]
    fn test_failed_run_keeps_previous_results() {
        let mut registry = FilterRegistry::with_builtins();
        registry
            .register(
                "broken",
                |_band: Image| -> std::result::Result<Image, crate::error::PrimitiveError> {
                    Err(crate::error::PrimitiveError::new("boom"))
                },
                0,
                true,
                crate::filters::OutputChannels::SameAsInput,
            )
            .unwrap();
        let h = BenchmarkHarness::new(Arc::new(registry));

        let first = h.run_benchmark(&frame(), &["greyscale"], 1..=2, 1).unwrap();
        let err = h.run_benchmark(&frame(), &["greyscale", "broken"], 1..=2, 1).unwrap_err();
        assert!(matches!(err, Error::PrimitiveFailure { .. }));
        assert_eq!(h.state(), HarnessState::Completed(first));
    }

    #[test]
    fn test_sink_shows_and_closes_feeds() {
        let sink = Arc::new(MemorySink::new());
        let h = harness().with_sink(sink.clone());
        h.run_benchmark(&frame(), &["greyscale", "canny"], 1..=2, 2).unwrap();

        let shown: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                crate::sink::SinkEvent::Show { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec!["greyscale Feed".to_string(), "canny Feed".to_string()]);
        assert!(sink.open_frames().is_empty());
    }

    #[test]
    fn test_size_sweep_keeps_aspect_ratio() {
        let h = harness();
        let img = Image::zeros(10, 20, 3);
        let points = h.run_size_sweep(&img, "greyscale", &[4, 8], 2, 1).unwrap();

        let dims: Vec<_> = points.iter().map(|p| (p.height, p.width)).collect();
        assert_eq!(dims, vec![(4, 8), (8, 16)]);
        assert_eq!(h.state(), HarnessState::Idle);

        assert!(matches!(
            h.run_size_sweep(&img, "greyscale", &[0], 2, 1),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_run_configured() {
        let config = BenchmarkConfig {
            filters: vec!["median".to_string()],
            min_threads: 2,
            max_threads: 3,
            trials: 1,
            ..BenchmarkConfig::default()
        };
        let results = harness().run_configured(&frame(), &config).unwrap();
        assert_eq!(results.to_map()["median"].len(), 2);
    }

    #[test]
    fn test_configured_size_sweep_uses_config_heights() {
        let config = BenchmarkConfig {
            min_threads: 2,
            trials: 2,
            size_sweep_heights: vec![6, 12],
            ..BenchmarkConfig::default()
        };
        let img = Image::zeros(12, 18, 3);
        let points = harness()
            .run_configured_size_sweep(&img, "sobel", &config)
            .unwrap();

        let dims: Vec<_> = points.iter().map(|p| (p.height, p.width)).collect();
        assert_eq!(dims, vec![(6, 9), (12, 18)]);
        assert!(points.iter().all(|p| p.trial_durations.len() == 2));
    }

    #[test]
    fn test_default_null_sink_and_explicit_null_sink() {
        let default = harness();
        default.run_benchmark(&frame(), &["greyscale"], 1..=2, 1).unwrap();

        let explicit = harness().with_sink(Arc::new(NullSink));
        let results = explicit.run_benchmark(&frame(), &["greyscale"], 1..=2, 1).unwrap();
        assert_eq!(results.get("greyscale").unwrap().points.len(), 2);
        assert!(matches!(explicit.state(), HarnessState::Completed(_)));
    }
}
