//! Band boundary overlay.

use ndarray::s;

use super::segment::Segment;
use crate::image::Image;

/// Marker color (RGB).
pub const CUT_LINE_COLOR: [u8; 3] = [255, 255, 0];

/// Draw a one-pixel line at the first row of every core band after the first.
///
/// Single-channel images are promoted to RGB so the marker stays visible.
/// RGBA markers are opaque.
pub fn draw_cut_lines(image: &Image, segments: &[Segment]) -> Image {
    let mut out = match image.channels() {
        1 => image.to_channels(3).unwrap_or_else(|| image.clone()),
        _ => image.clone(),
    };
    let height = out.height();
    let mut data = out.view_mut();

    for segment in segments.iter().skip(1) {
        let y = segment.band_start;
        if y >= height {
            continue;
        }
        let mut row = data.slice_mut(s![y, .., ..]);
        for mut pixel in row.rows_mut() {
            for (c, v) in pixel.iter_mut().enumerate() {
                *v = match c {
                    0..=2 => CUT_LINE_COLOR[c],
                    _ => 255,
                };
            }
        }
    }

    out
}
