//! Ordered (Bayer) dithering.

use super::{map_pixels, nearest_color, Dither};
use crate::exec::ExecutionContext;
use crate::image::Image;
use crate::palette::Palette;

/// 4×4 Bayer index matrix, row-major by `[y % 4][x % 4]`.
pub const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Bias strength for a palette of `len` colors: `128 / cbrt(len)`.
///
/// Spreads each channel by roughly the gap between palette levels if the
/// colors formed a regular RGB grid.
#[inline]
pub(crate) fn amplitude(len: usize) -> f32 {
    128.0 / (len as f32).cbrt()
}

/// Bias for position (x, y), centered on zero, in `(-amp/2, amp/2)`.
#[inline]
pub(crate) fn bias(x: usize, y: usize, amp: f32) -> f32 {
    ((BAYER_4X4[y % 4][x % 4] as f32 + 0.5) / 16.0 - 0.5) * amp
}

/// Add a position-dependent Bayer bias to every channel, then pick the
/// nearest palette color.
pub struct Ordered;

impl Dither for Ordered {
    fn dither(&self, image: &Image, palette: &Palette, ctx: &ExecutionContext) -> Image {
        let amp = amplitude(palette.len());
        let colors = palette.colors();
        map_pixels(image, ctx, |x, y, p| {
            let b = bias(x, y, amp);
            let rgb = [p.r as f32 + b, p.g as f32 + b, p.b as f32 + b];
            colors[nearest_color(palette, rgb)]
        })
    }
}
