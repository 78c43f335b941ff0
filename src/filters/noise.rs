//! Noise filters: Median (with edge lift), Denoise.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use ndarray::{Array3, ArrayView3};

use super::core::{clamp_index, saturate_u8};

// ============================================================================
// Median Filter
// ============================================================================

/// Apply median filter.
///
/// Removes salt-and-pepper noise while preserving edges.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `radius` - Filter radius; the window is `(2 * radius + 1)^2`
///
/// # Returns
/// Median-filtered image with same channel count
pub fn median_u8(input: ArrayView3<u8>, radius: usize) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let window_size = (radius * 2 + 1) * (radius * 2 + 1);
    let r = radius as isize;
    let color_channels = if channels == 4 { 3 } else { channels };
    let mut values: Vec<u8> = Vec::with_capacity(window_size);

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                values.clear();

                for dy in -r..=r {
                    let sy = clamp_index(y, dy, height);
                    for dx in -r..=r {
                        let sx = clamp_index(x, dx, width);
                        values.push(input[[sy, sx, c]]);
                    }
                }

                values.sort_unstable();
                output[[y, x, c]] = values[values.len() / 2];
            }
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }

    output
}

/// 4-neighbour Laplacian, negative responses clipped to zero.
pub fn laplacian_u8(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let color_channels = if channels == 4 { 3 } else { channels };
    let mut output = Array3::<u8>::zeros((height, width, channels));

    for y in 0..height {
        let up = clamp_index(y, -1, height);
        let down = clamp_index(y, 1, height);
        for x in 0..width {
            let left = clamp_index(x, -1, width);
            let right = clamp_index(x, 1, width);
            for c in 0..color_channels {
                let lap = input[[up, x, c]] as i32
                    + input[[down, x, c]] as i32
                    + input[[y, left, c]] as i32
                    + input[[y, right, c]] as i32
                    - 4 * input[[y, x, c]] as i32;
                output[[y, x, c]] = lap.clamp(0, 255) as u8;
            }
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }

    output
}

/// Median filter followed by an edge lift: `1.2 * median + 0.2 * laplacian`.
///
/// Depends on rows within `radius + 1` of the output row.
pub fn median_enhanced_u8(input: ArrayView3<u8>, radius: usize) -> Array3<u8> {
    let filtered = median_u8(input, radius);
    let edges = laplacian_u8(filtered.view());
    let channels = filtered.dim().2;

    let mut output = filtered.clone();
    for ((y, x, c), v) in output.indexed_iter_mut() {
        if channels == 4 && c == 3 {
            continue;
        }
        *v = saturate_u8(1.2 * filtered[[y, x, c]] as f32 + 0.2 * edges[[y, x, c]] as f32);
    }
    output
}

// ============================================================================
// Denoise (patch-based non-local means)
// ============================================================================

/// Patch radius used when comparing neighbourhoods.
pub const DENOISE_PATCH_RADIUS: usize = 1;
/// Search radius around each pixel.
pub const DENOISE_SEARCH_RADIUS: usize = 3;

/// Apply non-local means denoising.
///
/// Each pixel becomes a weighted average of the pixels in its search window,
/// weighted by how similar their surrounding patches are. Output at row `y`
/// depends on rows within `DENOISE_SEARCH_RADIUS + DENOISE_PATCH_RADIUS`.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `strength` - Filter strength `h`; larger values smooth more
///
/// # Returns
/// Denoised image with same channel count
pub fn denoise_u8(input: ArrayView3<u8>, strength: f32) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let color_channels = if channels == 4 { 3 } else { channels };
    let p = DENOISE_PATCH_RADIUS as isize;
    let s = DENOISE_SEARCH_RADIUS as isize;
    let h2 = (strength * strength).max(f32::EPSILON);
    let patch_samples = ((2 * p + 1) * (2 * p + 1)) as f32 * color_channels as f32;

    let mut sum = vec![0.0f32; color_channels];

    for y in 0..height {
        for x in 0..width {
            sum.iter_mut().for_each(|v| *v = 0.0);
            let mut weight_sum = 0.0f32;

            for dy in -s..=s {
                for dx in -s..=s {
                    // Mean squared distance between the two patches
                    let mut dist = 0.0f32;
                    for py in -p..=p {
                        let ay = clamp_index(y, py, height);
                        let by = clamp_index(y, dy + py, height);
                        for px in -p..=p {
                            let ax = clamp_index(x, px, width);
                            let bx = clamp_index(x, dx + px, width);
                            for c in 0..color_channels {
                                let d = input[[ay, ax, c]] as f32 - input[[by, bx, c]] as f32;
                                dist += d * d;
                            }
                        }
                    }
                    let weight = (-(dist / patch_samples) / h2).exp();

                    let sy = clamp_index(y, dy, height);
                    let sx = clamp_index(x, dx, width);
                    for c in 0..color_channels {
                        sum[c] += input[[sy, sx, c]] as f32 * weight;
                    }
                    weight_sum += weight;
                }
            }

            for c in 0..color_channels {
                output[[y, x, c]] = if weight_sum > 0.0 {
                    saturate_u8(sum[c] / weight_sum)
                } else {
                    input[[y, x, c]]
                };
            }
            if channels == 4 {
                output[[y, x, 3]] = input[[y, x, 3]];
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_removes_salt_pepper() {
        let mut img = Array3::<u8>::zeros((5, 5, 4));
        for y in 0..5 {
            for x in 0..5 {
                img[[y, x, 0]] = 128;
                img[[y, x, 3]] = 255;
            }
        }
        // Add salt
        img[[2, 2, 0]] = 255;

        let result = median_u8(img.view(), 1);

        assert_eq!(result[[2, 2, 0]], 128);
        assert_eq!(result[[2, 2, 3]], 255);
    }

    #[test]
    fn test_median_preserves_edge() {
        let img = Array3::from_shape_fn((5, 5, 1), |(_, x, _)| if x < 2 { 0 } else { 200 });
        let result = median_u8(img.view(), 1);
        assert_eq!(result[[2, 0, 0]], 0);
        assert_eq!(result[[2, 4, 0]], 200);
    }

    #[test]
    fn test_laplacian_flat_is_zero() {
        let img = Array3::<u8>::from_elem((4, 4, 3), 77);
        assert!(laplacian_u8(img.view()).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_median_enhanced_lifts_flat_region() {
        let img = Array3::<u8>::from_elem((6, 6, 1), 100);
        let result = median_enhanced_u8(img.view(), 1);
        assert!(result.iter().all(|&v| v == 120));
    }

    #[test]
    fn test_denoise_smooth_region() {
        let mut img = Array3::<u8>::from_elem((7, 7, 3), 128);
        // Add slight noise manually
        img[[3, 3, 0]] = 135;

        let result = denoise_u8(img.view(), 10.0);

        assert!((result[[3, 3, 0]] as i32 - 128).abs() < 7);
    }

    #[test]
    fn test_denoise_preserves_alpha() {
        let mut img = Array3::<u8>::from_elem((3, 3, 4), 90);
        for y in 0..3 {
            for x in 0..3 {
                img[[y, x, 3]] = 180;
            }
        }
        let result = denoise_u8(img.view(), 10.0);
        assert_eq!(result[[1, 1, 3]], 180);
        assert_eq!(result[[1, 1, 0]], 90);
    }
}
