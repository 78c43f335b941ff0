//! Affine resize and rotation.
//!
//! Both operations change the image geometry, so they only run on whole
//! images. Sampling is bilinear; pixels rotated in from outside the source
//! are black (alpha 0 for RGBA).

use ndarray::{Array3, ArrayView3};

use super::core::saturate_u8;
use crate::error::PrimitiveError;

/// Bilinear sample at fractional source coordinates, clamped to the edge.
fn sample_clamped(input: &ArrayView3<u8>, fy: f32, fx: f32, c: usize) -> f32 {
    let (height, width, _) = input.dim();
    let fy = fy.clamp(0.0, (height - 1) as f32);
    let fx = fx.clamp(0.0, (width - 1) as f32);
    let y0 = fy.floor() as usize;
    let x0 = fx.floor() as usize;
    let y1 = (y0 + 1).min(height - 1);
    let x1 = (x0 + 1).min(width - 1);
    let wy = fy - y0 as f32;
    let wx = fx - x0 as f32;

    let top = input[[y0, x0, c]] as f32 * (1.0 - wx) + input[[y0, x1, c]] as f32 * wx;
    let bottom = input[[y1, x0, c]] as f32 * (1.0 - wx) + input[[y1, x1, c]] as f32 * wx;
    top * (1.0 - wy) + bottom * wy
}

/// Resize to an explicit size with bilinear interpolation.
///
/// # Arguments
/// * `input` - Image (height, width, channels), not empty
/// * `new_height` / `new_width` - Target size, both at least 1
pub fn resize_to_u8(input: ArrayView3<u8>, new_height: usize, new_width: usize) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let scale_y = height as f32 / new_height as f32;
    let scale_x = width as f32 / new_width as f32;

    Array3::from_shape_fn((new_height, new_width, channels), |(y, x, c)| {
        // Pixel-center alignment
        let fy = (y as f32 + 0.5) * scale_y - 0.5;
        let fx = (x as f32 + 0.5) * scale_x - 0.5;
        saturate_u8(sample_clamped(&input, fy, fx, c))
    })
}

/// Scale by `scale`, then rotate by `angle` degrees counter-clockwise about
/// the center. The canvas grows to the rotated bounding box.
///
/// # Returns
/// Transformed image; fails for a non-positive or non-finite scale, or a
/// non-finite angle.
pub fn resize_rotate_u8(
    input: ArrayView3<u8>,
    scale: f64,
    angle: f64,
) -> Result<Array3<u8>, PrimitiveError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(PrimitiveError::new(format!("invalid scale {scale}")));
    }
    if !angle.is_finite() {
        return Err(PrimitiveError::new(format!("invalid angle {angle}")));
    }

    let (height, width, channels) = input.dim();
    let rh = ((height as f64 * scale).round() as usize).max(1);
    let rw = ((width as f64 * scale).round() as usize).max(1);
    let resized = if (rh, rw) == (height, width) {
        input.to_owned()
    } else {
        resize_to_u8(input, rh, rw)
    };

    if angle % 360.0 == 0.0 {
        return Ok(resized);
    }

    let (sin, cos) = angle.to_radians().sin_cos();
    let out_w = ((rw as f64 * cos.abs() + rh as f64 * sin.abs()).round() as usize).max(1);
    let out_h = ((rw as f64 * sin.abs() + rh as f64 * cos.abs()).round() as usize).max(1);

    let (src_cx, src_cy) = (rw as f64 / 2.0, rh as f64 / 2.0);
    let (dst_cx, dst_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);
    let view = resized.view();

    Ok(Array3::from_shape_fn((out_h, out_w, channels), |(y, x, c)| {
        let u = x as f64 + 0.5 - dst_cx;
        let v = y as f64 + 0.5 - dst_cy;
        // Inverse rotation back into the resized source
        let sx = cos * u - sin * v + src_cx - 0.5;
        let sy = sin * u + cos * v + src_cy - 0.5;
        if sx < -0.5 || sy < -0.5 || sx > rw as f64 - 0.5 || sy > rh as f64 - 0.5 {
            return 0;
        }
        saturate_u8(sample_clamped(&view, sy as f32, sx as f32, c))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_half() {
        let img = Array3::<u8>::from_elem((10, 8, 3), 60);
        let result = resize_rotate_u8(img.view(), 0.5, 0.0).unwrap();
        assert_eq!(result.dim(), (5, 4, 3));
        assert!(result.iter().all(|&v| v == 60));
    }

    #[test]
    fn test_resize_to_keeps_gradient_monotonic() {
        let img = Array3::from_shape_fn((4, 16, 1), |(_, x, _)| (x * 16) as u8);
        let result = resize_to_u8(img.view(), 2, 8);
        for x in 1..8 {
            assert!(result[[0, x, 0]] >= result[[0, x - 1, 0]]);
        }
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let img = Array3::<u8>::from_elem((4, 10, 1), 200);
        let result = resize_rotate_u8(img.view(), 1.0, 90.0).unwrap();
        assert_eq!(result.dim(), (10, 4, 1));
        assert_eq!(result[[5, 2, 0]], 200);
    }

    #[test]
    fn test_rotate_45_grows_canvas_with_black_corners() {
        let img = Array3::<u8>::from_elem((20, 20, 3), 255);
        let result = resize_rotate_u8(img.view(), 1.0, 45.0).unwrap();
        assert_eq!(result.dim(), (28, 28, 3));
        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[14, 14, 0]], 255);
    }

    #[test]
    fn test_invalid_scale() {
        let img = Array3::<u8>::zeros((2, 2, 1));
        assert!(resize_rotate_u8(img.view(), 0.0, 0.0).is_err());
        assert!(resize_rotate_u8(img.view(), f64::NAN, 0.0).is_err());
    }
}
