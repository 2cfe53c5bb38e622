//! Quantization and dithering against a fixed palette
//!
//! Each algorithm maps an RGB image onto palette colors and returns an image
//! whose every pixel is a palette entry. [`to_indexed`] then turns such an
//! image into palette indices; [`quantize`] runs both steps.
//!
//! # Algorithms
//!
//! - [`Threshold`]: nearest palette color per pixel, no error carried.
//! - [`Ordered`]: 4×4 Bayer bias added before the nearest match.
//! - [`FloydSteinberg`]: error diffusion in raster order.
//!
//! All nearest-color decisions are made in CIE Lab.

mod floyd_steinberg;
mod ordered;
mod threshold;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use floyd_steinberg::FloydSteinberg;
pub use ordered::{Ordered, BAYER_4X4};
pub use threshold::Threshold;

use crate::color::{Lab, Pixel};
use crate::error::EngineError;
use crate::exec::ExecutionContext;
use crate::image::{Image, IndexedImage};
use crate::palette::Palette;

/// Maps an image onto the colors of a palette.
pub trait Dither {
    /// Returns an image of the same size whose pixels are all entries of
    /// `palette`.
    fn dither(&self, image: &Image, palette: &Palette, ctx: &ExecutionContext) -> Image;
}

/// Dither algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DitherPolicy {
    Threshold,
    Ordered,
    #[default]
    FloydSteinberg,
}

impl DitherPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DitherPolicy::Threshold => "threshold",
            DitherPolicy::Ordered => "ordered",
            DitherPolicy::FloydSteinberg => "floyd_steinberg",
        }
    }

    /// The algorithm behind this policy.
    pub fn ditherer(self) -> &'static dyn Dither {
        match self {
            DitherPolicy::Threshold => &Threshold,
            DitherPolicy::Ordered => &Ordered,
            DitherPolicy::FloydSteinberg => &FloydSteinberg,
        }
    }
}

impl fmt::Display for DitherPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DitherPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "threshold" => Ok(DitherPolicy::Threshold),
            "ordered" => Ok(DitherPolicy::Ordered),
            "floyd_steinberg" => Ok(DitherPolicy::FloydSteinberg),
            other => Err(EngineError::unsupported("dither policy", other)),
        }
    }
}

/// Nearest palette entry to float channels, clamped to 0..=255 first.
#[inline]
pub(crate) fn nearest_color(palette: &Palette, rgb: [f32; 3]) -> usize {
    let p = Pixel::from_f32(rgb[0], rgb[1], rgb[2]);
    palette.find_nearest(Lab::from(p)).0
}

/// Apply `per_pixel` to every pixel, one row per work item.
pub(crate) fn map_pixels<F>(image: &Image, ctx: &ExecutionContext, per_pixel: F) -> Image
where
    F: Fn(usize, usize, Pixel) -> Pixel + Send + Sync,
{
    let pixels: Vec<Pixel> = ctx
        .map_range(image.height(), |y| {
            image
                .row(y)
                .iter()
                .enumerate()
                .map(|(x, &p)| per_pixel(x, y, p))
                .collect::<Vec<_>>()
        })
        .concat();
    image.with_pixels(pixels)
}

/// Map every pixel to the index of the first exactly equal palette color,
/// falling back to the nearest color. Adds no error.
pub fn to_indexed(image: &Image, palette: &Palette, ctx: &ExecutionContext) -> IndexedImage {
    let data: Vec<u8> = ctx
        .map_range(image.height(), |y| {
            image
                .row(y)
                .iter()
                .map(|&p| palette.index_of(p) as u8)
                .collect::<Vec<_>>()
        })
        .concat();
    IndexedImage::from_validated(image.width(), image.height(), data)
}

/// Dither with `policy`, then map to indices.
pub fn quantize(
    image: &Image,
    palette: &Palette,
    policy: DitherPolicy,
    ctx: &ExecutionContext,
) -> IndexedImage {
    let dithered = policy.ditherer().dither(image, palette, ctx);
    let indexed = to_indexed(&dithered, palette, ctx);
    tracing::debug!(
        policy = %policy,
        width = indexed.width(),
        height = indexed.height(),
        colors = palette.len(),
        "Image quantized"
    );
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn bw() -> Palette {
        Palette::new(vec![Pixel::BLACK, Pixel::WHITE]).unwrap()
    }

    #[test]
    fn test_to_indexed_prefers_first_exact_match() {
        let red = Pixel::new(200, 0, 0);
        let palette = Palette::new(vec![Pixel::BLACK, red, red]).unwrap();
        let image =
            Image::from_pixels(3, 1, vec![red, Pixel::BLACK, Pixel::new(190, 0, 0)]).unwrap();
        let indexed = to_indexed(&image, &palette, &ExecutionContext::sequential());
        assert_eq!(indexed.data(), &[1, 0, 1]);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "floyd_steinberg".parse::<DitherPolicy>().unwrap(),
            DitherPolicy::FloydSteinberg
        );
        assert_eq!(
            "atkinson".parse::<DitherPolicy>().unwrap_err().kind(),
            ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_quantize_indices_in_range() {
        let pixels: Vec<Pixel> = (0..64u8).map(|i| Pixel::new(i * 4, 255 - i * 4, i)).collect();
        let image = Image::from_pixels(8, 8, pixels).unwrap();
        let palette = bw();
        for policy in [
            DitherPolicy::Threshold,
            DitherPolicy::Ordered,
            DitherPolicy::FloydSteinberg,
        ] {
            let indexed = quantize(&image, &palette, policy, &ExecutionContext::sequential());
            indexed.validate(&palette).unwrap();
            assert_eq!(indexed.data().len(), 64);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pixels: Vec<Pixel> = (0..96u8).map(|i| Pixel::new(i * 2, i, 255 - i)).collect();
        let image = Image::from_pixels(12, 8, pixels).unwrap();
        let palette = Palette::new(vec![
            Pixel::BLACK,
            Pixel::WHITE,
            Pixel::new(200, 40, 40),
            Pixel::new(40, 40, 200),
        ])
        .unwrap();
        let par = ExecutionContext::with_threads(4).unwrap();
        for policy in [
            DitherPolicy::Threshold,
            DitherPolicy::Ordered,
            DitherPolicy::FloydSteinberg,
        ] {
            let a = quantize(&image, &palette, policy, &ExecutionContext::sequential());
            let b = quantize(&image, &palette, policy, &par);
            assert_eq!(a, b, "{policy} differs between backends");
        }
    }
}
