//! Summary statistics over one filter's thread-count series.
//!
//! All figures come from the per-point means; no outlier rejection.

use super::BenchmarkResult;

/// Floor applied to means before dividing, so a sub-microsecond point does
/// not produce an infinite speedup.
const MIN_MEAN_MICROS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// `max - min`
    pub range: f64,
    /// Lowest thread count whose mean equals `min`.
    pub best_thread_count: usize,
}

/// Summarize a series ordered by ascending thread count.
///
/// Returns `None` for an empty series.
pub fn summarize(series: &[BenchmarkResult]) -> Option<Summary> {
    let first = series.first()?;

    let mut min = first.mean_duration;
    let mut max = first.mean_duration;
    let mut best_thread_count = first.thread_count;
    let mut total = 0.0f64;

    for point in series {
        total += point.mean_duration;
        // Strict comparison keeps the first (lowest thread count) minimum
        if point.mean_duration < min {
            min = point.mean_duration;
            best_thread_count = point.thread_count;
        }
        if point.mean_duration > max {
            max = point.mean_duration;
        }
    }

    Some(Summary {
        mean: total / series.len() as f64,
        min,
        max,
        range: max - min,
        best_thread_count,
    })
}

/// Speedup of every point relative to the first point of the series.
///
/// # Returns
/// `(thread_count, baseline_mean / mean)` per point; empty for an empty series.
pub fn speedups(series: &[BenchmarkResult]) -> Vec<(usize, f64)> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let baseline = first.mean_duration.max(MIN_MEAN_MICROS);

    series
        .iter()
        .map(|point| (point.thread_count, baseline / point.mean_duration.max(MIN_MEAN_MICROS)))
        .collect()
}
