//! Core utilities shared by the reference filter primitives.
//!
//! This module provides:
//! - Gaussian and binomial kernel generation
//! - Clamp-to-edge indexing
//! - Saturating conversion back to u8
//!
//! Every primitive in this crate samples outside the image by clamping to the
//! nearest edge pixel. That makes a primitive's output at row `y` depend only
//! on rows within its neighborhood radius, which is what lets the executor
//! split an image into overlapping bands and get identical results.

/// Generate a normalized 1D Gaussian kernel of `size` taps.
///
/// # Arguments
/// * `size` - Number of taps (odd)
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Normalized kernel as Vec<f32>
pub fn gaussian_kernel_1d(size: usize, sigma: f32) -> Vec<f32> {
    if size <= 1 || sigma <= 0.0 {
        return vec![1.0];
    }

    let half = size / 2;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    // Normalize
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Row `n` of Pascal's triangle, e.g. `[1, 2, 1]` for `n = 2`.
pub fn binomial_row(n: usize) -> Vec<i32> {
    let mut row = vec![1i32];
    for _ in 0..n {
        let mut next = vec![1i32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

/// Index `base + offset` clamped to `[0, len)`.
#[inline]
pub fn clamp_index(base: usize, offset: isize, len: usize) -> usize {
    (base as isize + offset).clamp(0, len as isize - 1) as usize
}

/// Round and saturate to the u8 range.
#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Force a kernel size to be odd and at least `min`.
pub fn odd_kernel(size: usize, min: usize) -> usize {
    let size = if size % 2 == 0 { size + 1 } else { size };
    size.max(min)
}
