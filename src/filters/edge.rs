//! Edge detection filters: Sobel, Canny.
//!
//! Both filters compute BT.709 luminance first and return a single-channel
//! edge map (height, width, 1). Borders are clamp-to-edge, so the output at
//! row `y` only depends on a fixed number of rows around `y`:
//! `kernel_size / 2` for Sobel, 3 for Canny.

use ndarray::{Array2, Array3, ArrayView3};

use super::core::{binomial_row, clamp_index};
use crate::image::luminance;

// ============================================================================
// Sobel Edge Detection
// ============================================================================

/// Smoothing and first-derivative taps for an odd Sobel aperture.
///
/// `ksize = 3` gives `[1, 2, 1]` and `[-1, 0, 1]`.
fn sobel_taps(ksize: usize) -> (Vec<i32>, Vec<i32>) {
    let smooth = binomial_row(ksize - 1);
    let base = binomial_row(ksize - 2);
    let mut deriv = vec![0i32; ksize];
    for (i, &b) in base.iter().enumerate() {
        deriv[i] -= b;
        deriv[i + 2] += b;
    }
    (smooth, deriv)
}

/// Raw Sobel responses over a luminance plane.
fn sobel_gradients(gray: &Array2<i32>, ksize: usize) -> (Array2<i32>, Array2<i32>) {
    let (height, width) = gray.dim();
    let (smooth, deriv) = sobel_taps(ksize);
    let half = (ksize / 2) as isize;

    let mut gx = Array2::<i32>::zeros((height, width));
    let mut gy = Array2::<i32>::zeros((height, width));

    for y in 0..height {
        for x in 0..width {
            let mut sx = 0i32;
            let mut sy = 0i32;
            for ky in 0..ksize {
                let py = clamp_index(y, ky as isize - half, height);
                for kx in 0..ksize {
                    let px = clamp_index(x, kx as isize - half, width);
                    let v = gray[[py, px]];
                    sx += v * smooth[ky] * deriv[kx];
                    sy += v * deriv[ky] * smooth[kx];
                }
            }
            gx[[y, x]] = sx;
            gy[[y, x]] = sy;
        }
    }

    (gx, gy)
}

fn gray_plane(input: ArrayView3<u8>) -> Array2<i32> {
    let lum = luminance(input);
    let (height, width, _) = lum.dim();
    Array2::from_shape_fn((height, width), |(y, x)| lum[[y, x, 0]] as i32)
}

/// Apply Sobel edge detection.
///
/// The absolute horizontal and vertical responses are saturated to 0-255 and
/// averaged. A direction with order 0 contributes nothing.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `dx` - Use the horizontal derivative when > 0
/// * `dy` - Use the vertical derivative when > 0
/// * `ksize` - Odd aperture size, at least 3
///
/// # Returns
/// Single-channel edge map
pub fn sobel_u8(input: ArrayView3<u8>, dx: u32, dy: u32, ksize: usize) -> Array3<u8> {
    let gray = gray_plane(input);
    let (height, width) = gray.dim();
    let (gx, gy) = sobel_gradients(&gray, ksize);

    Array3::from_shape_fn((height, width, 1), |(y, x, _)| {
        let ax = if dx > 0 { gx[[y, x]].abs().min(255) } else { 0 };
        let ay = if dy > 0 { gy[[y, x]].abs().min(255) } else { 0 };
        ((ax + ay) as f32 * 0.5).round() as u8
    })
}

// ============================================================================
// Canny Edge Detection
// ============================================================================

const TAN_22_5: f32 = 0.414_213_57;

/// Apply Canny edge detection.
///
/// 3x3 Sobel gradients with L1 magnitude, non-maximum suppression along the
/// quantized gradient direction, then double thresholding. Hysteresis is
/// local: a weak pixel survives when one of its 8 neighbours is strong.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `low` - Lower hysteresis threshold
/// * `high` - Upper hysteresis threshold
///
/// # Returns
/// Single-channel map with edges at 255 and background at 0
pub fn canny_u8(input: ArrayView3<u8>, low: f32, high: f32) -> Array3<u8> {
    let gray = gray_plane(input);
    let (height, width) = gray.dim();
    let (gx, gy) = sobel_gradients(&gray, 3);
    let (low, high) = if low > high { (high, low) } else { (low, high) };

    let magnitude = Array2::from_shape_fn((height, width), |(y, x)| {
        (gx[[y, x]].abs() + gy[[y, x]].abs()) as f32
    });

    // Non-maximum suppression
    let mut suppressed = Array2::<f32>::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let m = magnitude[[y, x]];
            if m <= low {
                continue;
            }
            let ax = gx[[y, x]].abs() as f32;
            let ay = gy[[y, x]].abs() as f32;

            let (oy, ox): (isize, isize) = if ay <= ax * TAN_22_5 {
                (0, 1)
            } else if ay >= ax / TAN_22_5 {
                (1, 0)
            } else if (gx[[y, x]] < 0) != (gy[[y, x]] < 0) {
                (1, -1)
            } else {
                (1, 1)
            };

            let before = magnitude[[clamp_index(y, -oy, height), clamp_index(x, -ox, width)]];
            let after = magnitude[[clamp_index(y, oy, height), clamp_index(x, ox, width)]];
            if m > before && m >= after {
                suppressed[[y, x]] = m;
            }
        }
    }

    // Double threshold + local hysteresis
    let mut output = Array3::<u8>::zeros((height, width, 1));
    for y in 0..height {
        for x in 0..width {
            let m = suppressed[[y, x]];
            let keep = if m > high {
                true
            } else if m > low {
                (-1..=1).any(|dy| {
                    (-1..=1).any(|dx| {
                        suppressed[[clamp_index(y, dy, height), clamp_index(x, dx, width)]] > high
                    })
                })
            } else {
                false
            };
            if keep {
                output[[y, x, 0]] = 255;
            }
        }
    }

    output
}
