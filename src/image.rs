//! Row-major pixel buffer used by every filter call.
//!
//! ## Layout
//!
//! An [`Image`] wraps an `ndarray::Array3<u8>` of shape
//! `(height, width, channels)`:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel |
//! | RGB8 | (H, W, 3) | Red, green, blue |
//! | RGBA8 | (H, W, 4) | RGB + alpha |
//!
//! Buffers are never shared mutably between calls: every filter call
//! produces a fresh output image.

use ndarray::{s, Array3, ArrayView3, ArrayViewMut3};

use crate::error::{Error, Result};

/// ITU-R BT.709 luminosity coefficients
pub(crate) const LUMA_R: f32 = 0.2126;
pub(crate) const LUMA_G: f32 = 0.7152;
pub(crate) const LUMA_B: f32 = 0.0722;

/// Owned `(height, width, channels)` u8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Array3<u8>,
}

impl Image {
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// All-zero image.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self {
            data: Array3::<u8>::zeros((height, width, channels)),
        }
    }

    /// Build an image from a flat row-major buffer.
    pub fn from_raw(height: usize, width: usize, channels: usize, raw: Vec<u8>) -> Result<Self> {
        let data = Array3::from_shape_vec((height, width, channels), raw).map_err(|e| {
            Error::InvalidInput(format!(
                "buffer does not match {height}x{width}x{channels}: {e}"
            ))
        })?;
        Ok(Self { data })
    }

    /// Build an image by evaluating `f(y, x, c)` for every sample.
    pub fn from_fn<F>(height: usize, width: usize, channels: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> u8,
    {
        Self {
            data: Array3::from_shape_fn((height, width, channels), |(y, x, c)| f(y, x, c)),
        }
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// True when any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Flat row-major copy of the samples.
    pub fn into_raw(self) -> Vec<u8> {
        if self.data.is_standard_layout() {
            self.data.into_raw_vec_and_offset().0
        } else {
            self.data.iter().copied().collect()
        }
    }

    /// Owned copy of rows `[start, end)`.
    pub fn rows(&self, start: usize, end: usize) -> Image {
        Image {
            data: self.data.slice(s![start..end, .., ..]).to_owned(),
        }
    }

    /// Convert to `target` channels.
    ///
    /// Returns `None` when no conversion between the two layouts is defined.
    ///
    /// | From | To | Rule |
    /// |------|----|------|
    /// | 1 | 3 | replicate luminance |
    /// | 1 | 4 | replicate luminance, opaque alpha |
    /// | 3, 4 | 1 | BT.709 luminance |
    /// | 3 | 4 | opaque alpha |
    /// | 4 | 3 | drop alpha |
    pub fn to_channels(&self, target: usize) -> Option<Image> {
        let (height, width, channels) = self.data.dim();
        if channels == target {
            return Some(self.clone());
        }

        let input = &self.data;
        let data = match (channels, target) {
            (1, 3) => Array3::from_shape_fn((height, width, 3), |(y, x, _)| input[[y, x, 0]]),
            (1, 4) => Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
                if c == 3 {
                    255
                } else {
                    input[[y, x, 0]]
                }
            }),
            (3, 1) | (4, 1) => Array3::from_shape_fn((height, width, 1), |(y, x, _)| {
                luma_u8(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]])
            }),
            (3, 4) => Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
                if c == 3 {
                    255
                } else {
                    input[[y, x, c]]
                }
            }),
            (4, 3) => self.data.slice(s![.., .., 0..3]).to_owned(),
            _ => return None,
        };

        Some(Image { data })
    }
}

impl From<Array3<u8>> for Image {
    fn from(data: Array3<u8>) -> Self {
        Self { data }
    }
}

/// BT.709 luminance of one RGB sample.
#[inline]
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32) as u8
}

/// Single-channel luminance plane of any 1, 3 or 4 channel view.
pub(crate) fn luminance(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    if channels < 3 {
        return input.slice(s![.., .., 0..1]).to_owned();
    }
    Array3::from_shape_fn((height, width, 1), |(y, x, _)| {
        luma_u8(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]])
    })
}
