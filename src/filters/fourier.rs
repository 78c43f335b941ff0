//! Discrete Fourier magnitude spectrum.
//!
//! The spectrum of every output pixel depends on every input pixel, so this
//! filter can only run on the whole image.

use ndarray::{Array2, Array3, ArrayView3, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::PrimitiveError;
use crate::image::luminance;

/// 2D forward FFT of a luminance plane: rows first, then columns.
fn fft_2d(plane: &Array2<f64>) -> Array2<Complex<f64>> {
    let (height, width) = plane.dim();
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(width);
    let col_fft = planner.plan_fft_forward(height);

    let mut data = plane.mapv(|v| Complex::new(v, 0.0));

    let mut buffer = vec![Complex::new(0.0, 0.0); width];
    for mut row in data.axis_iter_mut(Axis(0)) {
        buffer.iter_mut().zip(row.iter()).for_each(|(b, &v)| *b = v);
        row_fft.process(&mut buffer);
        row.iter_mut().zip(buffer.iter()).for_each(|(v, &b)| *v = b);
    }

    let mut buffer = vec![Complex::new(0.0, 0.0); height];
    for mut col in data.axis_iter_mut(Axis(1)) {
        buffer.iter_mut().zip(col.iter()).for_each(|(b, &v)| *b = v);
        col_fft.process(&mut buffer);
        col.iter_mut().zip(buffer.iter()).for_each(|(v, &b)| *v = b);
    }

    data
}

/// Log-magnitude spectrum, centered and normalized to 0-255.
///
/// Odd dimensions are cropped by one row/column so the quadrant swap that
/// moves the zero frequency to the center is exact.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// Single-channel spectrum of shape (even height, even width, 1)
pub fn magnitude_spectrum_u8(input: ArrayView3<u8>) -> Result<Array3<u8>, PrimitiveError> {
    let lum = luminance(input);
    let (height, width, _) = lum.dim();
    let (out_h, out_w) = (height - height % 2, width - width % 2);
    if out_h == 0 || out_w == 0 {
        return Err(PrimitiveError::new(format!(
            "{height}x{width} image is too small for a centered spectrum"
        )));
    }

    let plane = Array2::from_shape_fn((height, width), |(y, x)| lum[[y, x, 0]] as f64);
    let freq = fft_2d(&plane);

    // log(1 + |F|), cropped to even size and quadrant-swapped
    let (cy, cx) = (out_h / 2, out_w / 2);
    let spectrum = Array2::from_shape_fn((out_h, out_w), |(y, x)| {
        let sy = (y + cy) % out_h;
        let sx = (x + cx) % out_w;
        (1.0 + freq[[sy, sx]].norm()).ln()
    });

    let min = spectrum.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = spectrum.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    Ok(Array3::from_shape_fn((out_h, out_w, 1), |(y, x, _)| {
        if span > 0.0 {
            ((spectrum[[y, x]] - min) / span * 255.0).round() as u8
        } else {
            0
        }
    }))
}
