//! JSON run configuration.
//!
//! ```json
//! {
//!   "processor": { "threads": 8 },
//!   "benchmark": { "filters": ["gaussian", "sobel"], "min_threads": 1, "max_threads": 8, "trials": 5 }
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_THREADS: usize = 4;
const DEFAULT_TRIALS: usize = 3;
const DEFAULT_SIZE_SWEEP_HEIGHTS: [usize; 5] = [480, 720, 1080, 1440, 2160];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub threads: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub filters: Vec<String>,
    pub min_threads: usize,
    pub max_threads: usize,
    pub trials: usize,
    /// Image heights for the execution-time-vs-size sweep.
    pub size_sweep_heights: Vec<usize>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            filters: [
                "greyscale",
                "gaussian",
                "median",
                "denoising",
                "canny",
                "sobel",
                "fourier",
                "rotate",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_threads: 1,
            max_threads: 10,
            trials: DEFAULT_TRIALS,
            size_sweep_heights: DEFAULT_SIZE_SWEEP_HEIGHTS.to_vec(),
        }
    }
}

impl BenchmarkConfig {
    pub fn thread_range(&self) -> RangeInclusive<usize> {
        self.min_threads..=self.max_threads
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub processor: ProcessorConfig,
    pub benchmark: BenchmarkConfig,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
}

pub fn parse_config(json: &str) -> Result<RuntimeConfig> {
    serde_json::from_str(json).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.processor.threads, 4);
        assert_eq!(config.benchmark.thread_range(), 1..=10);
        assert_eq!(config.benchmark.trials, 3);
        assert_eq!(config.benchmark.filters.len(), 8);
    }

    #[test]
    fn test_partial_override() {
        let config =
            parse_config(r#"{"benchmark": {"filters": ["sobel"], "max_threads": 3}}"#).unwrap();
        assert_eq!(config.benchmark.filters, vec!["sobel".to_string()]);
        assert_eq!(config.benchmark.thread_range(), 1..=3);
        assert_eq!(config.benchmark.trials, 3);
        assert_eq!(config.processor.threads, 4);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_config("{"), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/rowband.json")).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("Failed to read")));
    }
}
