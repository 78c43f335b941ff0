//! Grayscale conversion filter.
//!
//! Uses ITU-R BT.709 luminosity coefficients. The result is always a single
//! luminance channel; when the filter is registered with
//! `OutputChannels::SameAsInput` the executor replicates it back into the
//! caller's channel layout.

use ndarray::{Array3, ArrayView3};

use crate::image::luminance;

/// Convert an image with 1, 3, or 4 channels to a single luminance channel.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, channels)
///
/// # Returns
/// New (height, width, 1) array. Single-channel input is copied unchanged.
pub fn grayscale_u8(input: ArrayView3<u8>) -> Array3<u8> {
    luminance(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_grayscale_red() {
        let mut img = Array3::<u8>::zeros((1, 1, 3));
        img[[0, 0, 0]] = 255; // R

        let result = grayscale_u8(img.view());

        // 0.2126 * 255 ≈ 54
        assert_eq!(result.dim(), (1, 1, 1));
        assert!((result[[0, 0, 0]] as i32 - 54).abs() <= 1);
    }

    #[test]
    fn test_grayscale_ignores_alpha() {
        let mut img = Array3::<u8>::zeros((1, 1, 4));
        img[[0, 0, 0]] = 128;
        img[[0, 0, 1]] = 128;
        img[[0, 0, 2]] = 128;
        img[[0, 0, 3]] = 10;

        let result = grayscale_u8(img.view());
        assert!((result[[0, 0, 0]] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_grayscale_passthrough_for_single_channel() {
        let img = Array3::from_shape_fn((2, 3, 1), |(y, x, _)| (y * 3 + x) as u8);
        assert_eq!(grayscale_u8(img.view()), img);
    }
}
