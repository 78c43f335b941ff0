//! Filter primitives and the registry that names them.
//!
//! ## Supported Formats
//!
//! All reference filters take `u8` images with 1, 3, or 4 channels:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! ## Partitioning
//!
//! Neighborhood filters use clamp-to-edge borders and are deterministic, so
//! running them on an overlap-extended band and cropping gives exactly the
//! rows a whole-image call would. Each builtin declares the overlap radius
//! that makes this hold:
//!
//! | Filter | Overlap radius | Partitionable | Output channels |
//! |--------|----------------|---------------|-----------------|
//! | greyscale | 0 | yes | same as input |
//! | gaussian | kernel / 2 | yes | same as input |
//! | median | kernel / 2 + 1 | yes | same as input |
//! | denoising | 4 | yes | same as input |
//! | canny | 3 | yes | 1 |
//! | sobel | kernel / 2 | yes | 1 |
//! | fourier | - | no | 1 |
//! | resize | - | no | same as input |
//! | rotate | - | no | same as input |

pub mod core;
pub mod grayscale;
pub mod blur;
pub mod noise;
pub mod edge;
pub mod fourier;
pub mod geometry;

pub mod registry;
pub mod builtin;

pub use builtin::BuiltinFilter;
pub use registry::{FilterRegistry, FilterSpec, OutputChannels, Primitive};
