//! Builtin filter catalogue.
//!
//! Every reference filter is a variant of [`BuiltinFilter`]; its name,
//! partition policy and primitive are exhaustive matches, so adding a variant
//! without wiring it up does not compile.

use std::sync::Arc;

use super::blur::gaussian_enhanced_u8;
use super::core::odd_kernel;
use super::edge::{canny_u8, sobel_u8};
use super::fourier::magnitude_spectrum_u8;
use super::geometry::resize_rotate_u8;
use super::grayscale::grayscale_u8;
use super::noise::{denoise_u8, median_enhanced_u8, DENOISE_PATCH_RADIUS, DENOISE_SEARCH_RADIUS};
use super::registry::{spec_from_parts, FilterSpec, OutputChannels, Primitive};
use crate::error::PrimitiveError;
use crate::image::Image;

const MIN_GAUSSIAN_KERNEL: usize = 15;
const MIN_MEDIAN_KERNEL: usize = 9;
const MIN_SOBEL_KERNEL: usize = 3;
const MAX_SOBEL_KERNEL: usize = 7;
const MIN_SIGMA: f32 = 0.1;
const DENOISE_STRENGTH_RANGE: (f32, f32) = (1.0, 30.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuiltinFilter {
    Grayscale,
    /// Gaussian blur followed by a `1.2x + 10` contrast lift.
    Gaussian { kernel_size: usize, sigma: f32 },
    /// Median blur followed by a Laplacian edge lift.
    Median { kernel_size: usize },
    Canny { low: f32, high: f32 },
    Sobel { dx: u32, dy: u32, kernel_size: usize },
    Denoise { strength: f32 },
    Fourier,
    Resize { scale: f64 },
    /// Counter-clockwise rotation in degrees.
    Rotate { angle: f64 },
}

impl BuiltinFilter {
    /// Default parameterization of every builtin, in catalogue order.
    pub fn defaults() -> Vec<BuiltinFilter> {
        vec![
            BuiltinFilter::Grayscale,
            BuiltinFilter::Gaussian {
                kernel_size: 15,
                sigma: 5.0,
            },
            BuiltinFilter::Median { kernel_size: 9 },
            BuiltinFilter::Denoise { strength: 10.0 },
            BuiltinFilter::Canny {
                low: 20.0,
                high: 80.0,
            },
            BuiltinFilter::Sobel {
                dx: 1,
                dy: 0,
                kernel_size: 3,
            },
            BuiltinFilter::Fourier,
            BuiltinFilter::Resize { scale: 0.5 },
            BuiltinFilter::Rotate { angle: 45.0 },
        ]
    }

    /// Default parameterization for a registered name.
    pub fn from_name(name: &str) -> Option<BuiltinFilter> {
        Self::defaults().into_iter().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFilter::Grayscale => "greyscale",
            BuiltinFilter::Gaussian { .. } => "gaussian",
            BuiltinFilter::Median { .. } => "median",
            BuiltinFilter::Canny { .. } => "canny",
            BuiltinFilter::Sobel { .. } => "sobel",
            BuiltinFilter::Denoise { .. } => "denoising",
            BuiltinFilter::Fourier => "fourier",
            BuiltinFilter::Resize { .. } => "resize",
            BuiltinFilter::Rotate { .. } => "rotate",
        }
    }

    /// Clamp parameters into the ranges the primitives accept.
    ///
    /// Kernel sizes are forced odd, Gaussian kernels to at least 15 taps,
    /// median kernels to at least 9, Sobel apertures to 3..=7. Denoise
    /// strength is clamped to `[1, 30]`.
    pub fn normalized(self) -> BuiltinFilter {
        match self {
            BuiltinFilter::Gaussian { kernel_size, sigma } => BuiltinFilter::Gaussian {
                kernel_size: odd_kernel(kernel_size, MIN_GAUSSIAN_KERNEL),
                sigma: if sigma.is_finite() { sigma.max(MIN_SIGMA) } else { MIN_SIGMA },
            },
            BuiltinFilter::Median { kernel_size } => BuiltinFilter::Median {
                kernel_size: odd_kernel(kernel_size, MIN_MEDIAN_KERNEL),
            },
            BuiltinFilter::Sobel {
                dx,
                dy,
                kernel_size,
            } => BuiltinFilter::Sobel {
                dx,
                dy,
                kernel_size: odd_kernel(kernel_size, MIN_SOBEL_KERNEL).min(MAX_SOBEL_KERNEL),
            },
            BuiltinFilter::Denoise { strength } => {
                let (lo, hi) = DENOISE_STRENGTH_RANGE;
                BuiltinFilter::Denoise {
                    strength: if strength.is_finite() { strength.clamp(lo, hi) } else { lo },
                }
            }
            other => other,
        }
    }

    /// Rows of context needed on each side of an output row.
    pub fn overlap_radius(&self) -> usize {
        match self.normalized() {
            BuiltinFilter::Grayscale => 0,
            BuiltinFilter::Gaussian { kernel_size, .. } => kernel_size / 2,
            // Median window plus the 1-row Laplacian on top of it
            BuiltinFilter::Median { kernel_size } => kernel_size / 2 + 1,
            // Sobel 1 + suppression 1 + hysteresis 1
            BuiltinFilter::Canny { .. } => 3,
            BuiltinFilter::Sobel { kernel_size, .. } => kernel_size / 2,
            BuiltinFilter::Denoise { .. } => DENOISE_SEARCH_RADIUS + DENOISE_PATCH_RADIUS,
            BuiltinFilter::Fourier | BuiltinFilter::Resize { .. } | BuiltinFilter::Rotate { .. } => 0,
        }
    }

    pub fn partitionable(&self) -> bool {
        match self {
            BuiltinFilter::Fourier | BuiltinFilter::Resize { .. } | BuiltinFilter::Rotate { .. } => {
                false
            }
            BuiltinFilter::Grayscale
            | BuiltinFilter::Gaussian { .. }
            | BuiltinFilter::Median { .. }
            | BuiltinFilter::Canny { .. }
            | BuiltinFilter::Sobel { .. }
            | BuiltinFilter::Denoise { .. } => true,
        }
    }

    pub fn output_channels(&self) -> OutputChannels {
        match self {
            BuiltinFilter::Canny { .. } | BuiltinFilter::Sobel { .. } | BuiltinFilter::Fourier => {
                OutputChannels::Fixed(1)
            }
            // Grayscale yields one channel; the executor replicates it back
            BuiltinFilter::Grayscale
            | BuiltinFilter::Gaussian { .. }
            | BuiltinFilter::Median { .. }
            | BuiltinFilter::Denoise { .. }
            | BuiltinFilter::Resize { .. }
            | BuiltinFilter::Rotate { .. } => OutputChannels::SameAsInput,
        }
    }

    /// The primitive for the normalized parameters.
    pub fn primitive(&self) -> Arc<dyn Primitive> {
        match self.normalized() {
            BuiltinFilter::Grayscale => Arc::new(|band: Image| -> Result<Image, PrimitiveError> {
                Ok(grayscale_u8(band.view()).into())
            }),
            BuiltinFilter::Gaussian { kernel_size, sigma } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    Ok(gaussian_enhanced_u8(band.view(), kernel_size, sigma).into())
                })
            }
            BuiltinFilter::Median { kernel_size } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    Ok(median_enhanced_u8(band.view(), kernel_size / 2).into())
                })
            }
            BuiltinFilter::Canny { low, high } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    Ok(canny_u8(band.view(), low, high).into())
                })
            }
            BuiltinFilter::Sobel {
                dx,
                dy,
                kernel_size,
            } => Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                if dx == 0 && dy == 0 {
                    return Err(PrimitiveError::new("sobel needs dx > 0 or dy > 0"));
                }
                Ok(sobel_u8(band.view(), dx, dy, kernel_size).into())
            }),
            BuiltinFilter::Denoise { strength } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    Ok(denoise_u8(band.view(), strength).into())
                })
            }
            BuiltinFilter::Fourier => Arc::new(|band: Image| -> Result<Image, PrimitiveError> {
                magnitude_spectrum_u8(band.view()).map(Image::from)
            }),
            BuiltinFilter::Resize { scale } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    resize_rotate_u8(band.view(), scale, 0.0).map(Image::from)
                })
            }
            BuiltinFilter::Rotate { angle } => {
                Arc::new(move |band: Image| -> Result<Image, PrimitiveError> {
                    resize_rotate_u8(band.view(), 1.0, angle).map(Image::from)
                })
            }
        }
    }

    /// Registry entry under the canonical name.
    pub fn spec(&self) -> FilterSpec {
        spec_from_parts(
            self.name(),
            self.primitive(),
            self.overlap_radius(),
            self.partitionable(),
            self.output_channels(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(
            BuiltinFilter::Gaussian {
                kernel_size: 4,
                sigma: 0.0
            }
            .normalized(),
            BuiltinFilter::Gaussian {
                kernel_size: 15,
                sigma: 0.1
            }
        );
        assert_eq!(
            BuiltinFilter::Median { kernel_size: 12 }.normalized(),
            BuiltinFilter::Median { kernel_size: 13 }
        );
        assert_eq!(
            BuiltinFilter::Denoise { strength: 100.0 }.normalized(),
            BuiltinFilter::Denoise { strength: 30.0 }
        );
        assert_eq!(
            BuiltinFilter::Sobel {
                dx: 1,
                dy: 1,
                kernel_size: 10
            }
            .normalized(),
            BuiltinFilter::Sobel {
                dx: 1,
                dy: 1,
                kernel_size: 7
            }
        );
    }

    #[test]
    fn test_overlap_radius_follows_normalized_kernel() {
        assert_eq!(
            BuiltinFilter::Gaussian {
                kernel_size: 2,
                sigma: 5.0
            }
            .overlap_radius(),
            7
        );
        assert_eq!(BuiltinFilter::Median { kernel_size: 9 }.overlap_radius(), 5);
        assert_eq!(BuiltinFilter::Denoise { strength: 10.0 }.overlap_radius(), 4);
        assert_eq!(BuiltinFilter::Grayscale.overlap_radius(), 0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BuiltinFilter::from_name("fourier"), Some(BuiltinFilter::Fourier));
        assert_eq!(
            BuiltinFilter::from_name("denoising"),
            Some(BuiltinFilter::Denoise { strength: 10.0 })
        );
        assert_eq!(BuiltinFilter::from_name("grayscale"), None);
    }

    #[test]
    fn test_sobel_without_direction_fails() {
        let filter = BuiltinFilter::Sobel {
            dx: 0,
            dy: 0,
            kernel_size: 3,
        };
        assert!(filter.primitive().apply(Image::zeros(3, 3, 1)).is_err());
    }

    #[test]
    fn test_grayscale_primitive_returns_one_channel() {
        let out = BuiltinFilter::Grayscale
            .primitive()
            .apply(Image::zeros(2, 3, 4))
            .unwrap();
        assert_eq!((out.height(), out.width(), out.channels()), (2, 3, 1));
    }
}
