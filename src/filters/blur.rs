//! Gaussian blur with a contrast lift.
//!
//! Separable 2-pass convolution with clamp-to-edge borders. The output at row
//! `y` depends on rows `y - half ..= y + half` of the input, where
//! `half = kernel_size / 2`.

use ndarray::{Array3, ArrayView3};

use super::core::{clamp_index, gaussian_kernel_1d, saturate_u8};

/// Apply Gaussian blur to an image with any channel count.
///
/// # Arguments
/// * `input` - Image (height, width, channels) as u8
/// * `kernel_size` - Number of taps per pass (odd)
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Blurred image with same dimensions
pub fn gaussian_blur_u8(input: ArrayView3<u8>, kernel_size: usize, sigma: f32) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    let half = (kernel.len() / 2) as isize;

    // Work in f32 for precision
    let mut temp = Array3::<f32>::zeros((height, width, channels));
    let mut result = Array3::<u8>::zeros((height, width, channels));

    // Horizontal pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = clamp_index(x, ki as isize - half, width);
                    sum += input[[y, sx, c]] as f32 * kv;
                }
                temp[[y, x, c]] = sum;
            }
        }
    }

    // Vertical pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = clamp_index(y, ki as isize - half, height);
                    sum += temp[[sy, x, c]] * kv;
                }
                result[[y, x, c]] = saturate_u8(sum);
            }
        }
    }

    result
}

/// Linear contrast adjustment `alpha * v + beta`, saturated.
///
/// Alpha channel (if present) is preserved.
pub fn contrast_u8(input: ArrayView3<u8>, alpha: f32, beta: f32) -> Array3<u8> {
    let channels = input.dim().2;
    let mut output = input.to_owned();
    for ((_, _, c), v) in output.indexed_iter_mut() {
        if channels == 4 && c == 3 {
            continue;
        }
        *v = saturate_u8(*v as f32 * alpha + beta);
    }
    output
}

/// Gaussian blur followed by a `1.2x + 10` contrast lift.
pub fn gaussian_enhanced_u8(input: ArrayView3<u8>, kernel_size: usize, sigma: f32) -> Array3<u8> {
    let blurred = gaussian_blur_u8(input, kernel_size, sigma);
    contrast_u8(blurred.view(), 1.2, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_flat_image_unchanged() {
        let img = Array3::<u8>::from_elem((9, 9, 3), 100);
        let result = gaussian_blur_u8(img.view(), 5, 1.5);
        assert!(result.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut img = Array3::<u8>::zeros((9, 9, 1));
        img[[4, 4, 0]] = 255;
        let result = gaussian_blur_u8(img.view(), 5, 1.0);
        assert!(result[[4, 4, 0]] < 255);
        assert!(result[[4, 5, 0]] > 0);
        assert!(result[[3, 4, 0]] > 0);
        assert_eq!(result[[0, 0, 0]], 0);
    }

    #[test]
    fn test_contrast_preserves_alpha() {
        let img = Array3::<u8>::from_elem((1, 1, 4), 100);
        let result = contrast_u8(img.view(), 1.2, 10.0);
        assert_eq!(result[[0, 0, 0]], 130);
        assert_eq!(result[[0, 0, 3]], 100);
    }

    #[test]
    fn test_contrast_saturates() {
        let img = Array3::<u8>::from_elem((1, 1, 1), 250);
        assert_eq!(contrast_u8(img.view(), 1.2, 10.0)[[0, 0, 0]], 255);
    }
}
