//! Row-band geometry.
//!
//! Splits an image of `height` rows into one core band per worker and pads
//! each band by the filter's overlap radius so neighborhood filters see the
//! rows they need across band boundaries.

use std::ops::Range;

/// One worker's share of the image.
///
/// `band_start..band_end` is the core band the worker writes.
/// `ext_start..ext_end` is the overlap-extended band it reads; it is never
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub band_start: usize,
    pub band_end: usize,
    pub ext_start: usize,
    pub ext_end: usize,
}

impl Segment {
    pub fn core_range(&self) -> Range<usize> {
        self.band_start..self.band_end
    }

    pub fn ext_range(&self) -> Range<usize> {
        self.ext_start..self.ext_end
    }

    pub fn core_len(&self) -> usize {
        self.band_end - self.band_start
    }

    pub fn ext_len(&self) -> usize {
        self.ext_end - self.ext_start
    }

    /// Padding rows above the core band inside the extended band.
    pub fn top_crop(&self) -> usize {
        self.band_start - self.ext_start
    }

    /// Padding rows below the core band inside the extended band.
    pub fn bottom_crop(&self) -> usize {
        self.ext_end - self.band_end
    }
}

/// Number of bands actually used for an image of `height` rows.
///
/// Clamped to `[1, max(1, height)]` so no band is ever empty.
pub fn effective_threads(height: usize, thread_count: usize) -> usize {
    thread_count.clamp(1, height.max(1))
}

/// Plan the row bands for one partitioned call.
///
/// Band `i` covers `[i * base, (i + 1) * base)` with
/// `base = height / effective_threads`; the last band absorbs the remainder.
pub fn plan_segments(height: usize, thread_count: usize, overlap_radius: usize) -> Vec<Segment> {
    let threads = effective_threads(height, thread_count);
    let base = height / threads;

    (0..threads)
        .map(|i| {
            let band_start = i * base;
            let band_end = if i + 1 == threads { height } else { (i + 1) * base };
            Segment {
                band_start,
                band_end,
                ext_start: band_start.saturating_sub(overlap_radius),
                ext_end: (band_end + overlap_radius).min(height),
            }
        })
        .collect()
}
