//! Row-band parallel execution of one filter call.
//!
//! A partitioned call plans one [`Segment`] per worker, builds a fresh rayon
//! pool of that size, and hands each worker an exclusive mutable view of its
//! core rows in the output buffer. Workers read an owned copy of their
//! overlap-extended band, run the primitive, harmonize channels, crop the
//! overlap away and write the core rows. No locks are taken; the join is the
//! only blocking point.

pub mod cut_lines;
pub mod segment;

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use ndarray::{s, Array3, ArrayViewMut3, Axis};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::filters::{FilterRegistry, FilterSpec};
use crate::image::Image;
pub use cut_lines::draw_cut_lines;
pub use segment::{effective_threads, plan_segments, Segment};

/// Output of one executed filter call.
#[derive(Debug, Clone)]
pub struct Execution {
    pub image: Image,
    /// Wall-clock duration in microseconds.
    ///
    /// A synchronous call (one thread, or a non-partitionable filter) times
    /// the primitive alone. A partitioned call also includes building the
    /// thread pool, copying the bands and merging them, so a 1-thread point
    /// excludes setup costs that every multi-thread point pays.
    pub elapsed_micros: u64,
    /// Bands the call was split into; empty when it ran synchronously.
    pub segments: Vec<Segment>,
}

/// Dispatches filter calls over row bands.
///
/// Cheap to clone: the registry is shared read-only.
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    registry: Arc<FilterRegistry>,
}

impl ParallelExecutor {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Apply `filter_name` to `image` with up to `thread_count` workers.
    ///
    /// # Returns
    /// The filtered image and the elapsed time in microseconds.
    pub fn execute(&self, filter_name: &str, image: &Image, thread_count: usize) -> Result<(Image, u64)> {
        let execution = self.run(filter_name, image, thread_count)?;
        Ok((execution.image, execution.elapsed_micros))
    }

    /// Like [`execute`](Self::execute), also reporting the band layout used.
    pub fn run(&self, filter_name: &str, image: &Image, thread_count: usize) -> Result<Execution> {
        if image.is_empty() {
            return Err(Error::InvalidInput(format!(
                "empty image ({}x{}x{})",
                image.height(),
                image.width(),
                image.channels()
            )));
        }
        let spec = self.registry.lookup(filter_name)?;

        if thread_count <= 1 || !spec.partitionable() {
            debug!(
                "{}: running synchronously (threads {}, partitionable {})",
                spec.name(),
                thread_count,
                spec.partitionable()
            );
            return run_whole(spec, image);
        }

        run_partitioned(spec, image, thread_count)
    }
}

/// One primitive call on the whole image. Timed around the call only.
fn run_whole(spec: &FilterSpec, image: &Image) -> Result<Execution> {
    let input = image.clone();
    let start = Instant::now();
    let result = spec.primitive().apply(input);
    let elapsed_micros = micros_since(start);

    let result = result.map_err(|e| {
        warn!("{} failed: {}", spec.name(), e);
        Error::primitive(spec.name(), e.message)
    })?;
    let channels = spec.output_channels().resolve(image.channels());

    Ok(Execution {
        image: harmonize(spec, result, channels)?,
        elapsed_micros,
        segments: Vec::new(),
    })
}

fn run_partitioned(spec: &FilterSpec, image: &Image, thread_count: usize) -> Result<Execution> {
    let (height, width) = (image.height(), image.width());
    let segments = plan_segments(height, thread_count, spec.overlap_radius());
    let channels = spec.output_channels().resolve(image.channels());
    debug!(
        "{}: {} bands over {} rows, overlap {}",
        spec.name(),
        segments.len(),
        height,
        spec.overlap_radius()
    );

    let mut output = Array3::<u8>::zeros((height, width, channels));
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(segments.len())
        .thread_name(|idx| format!("rowband-{idx}"))
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;

    // Disjoint core-row views of the one output buffer
    let mut targets = Vec::with_capacity(segments.len());
    let mut rest = output.view_mut();
    for segment in &segments {
        let (head, tail) = rest.split_at(Axis(0), segment.core_len());
        targets.push((segment, head));
        rest = tail;
    }

    // Collect every outcome so all bands are joined before reporting failure
    let outcomes: Vec<Result<()>> = pool.install(|| {
        targets
            .into_par_iter()
            .map(|(segment, target)| run_band(spec, image, segment, channels, target))
            .collect()
    });
    let elapsed_micros = micros_since(start);

    if let Some(err) = outcomes.into_iter().find_map(|outcome| outcome.err()) {
        return Err(err);
    }

    Ok(Execution {
        image: Image::new(output),
        elapsed_micros,
        segments,
    })
}

fn run_band(
    spec: &FilterSpec,
    image: &Image,
    segment: &Segment,
    channels: usize,
    mut target: ArrayViewMut3<u8>,
) -> Result<()> {
    let band = image.rows(segment.ext_start, segment.ext_end);
    let result = spec.primitive().apply(band).map_err(|e| {
        warn!(
            "{} failed on rows {}..{}: {}",
            spec.name(),
            segment.ext_start,
            segment.ext_end,
            e
        );
        Error::primitive(spec.name(), e.message)
    })?;

    if result.height() != segment.ext_len() || result.width() != image.width() {
        return Err(Error::primitive(
            spec.name(),
            format!(
                "band result is {}x{}, expected {}x{}",
                result.height(),
                result.width(),
                segment.ext_len(),
                image.width()
            ),
        ));
    }

    let result = harmonize(spec, result, channels)?;
    let top = segment.top_crop();
    target.assign(&result.view().slice(s![top..top + segment.core_len(), .., ..]));
    Ok(())
}

/// Convert a primitive result to the channel count of the output buffer.
fn harmonize(spec: &FilterSpec, result: Image, channels: usize) -> Result<Image> {
    if result.channels() == channels {
        return Ok(result);
    }
    result.to_channels(channels).ok_or_else(|| {
        Error::primitive(
            spec.name(),
            format!("cannot convert {} channels to {}", result.channels(), channels),
        )
    })
}

fn micros_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
