//! Palette reduction
//!
//! Three algorithms pick at most `k` representative colors for an image:
//!
//! - [`median_cut`]: recursive box splitting at the weighted median.
//! - [`kmeans`]: Lloyd iterations in Lab with farthest-point seeding.
//! - [`octree`]: bottom-up merging of a depth-8 color octree.
//!
//! All three are deterministic and share two guarantees: the result never
//! holds more than `k` colors, and an image with `n <= k` distinct colors
//! yields exactly those `n` colors, without padding.
//!
//! Median cut and octree treat pixels as opaque byte triples. k-means
//! measures Lab distance, so an image produced by
//! [`make_lab_image`](crate::color::make_lab_image) goes through
//! [`reduce_lab`], which decodes those bytes as Lab instead of sRGB.

mod kmeans;
mod median_cut;
mod octree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use kmeans::{kmeans, kmeans_lab};
pub use median_cut::median_cut;
pub use octree::octree;

use crate::color::Pixel;
use crate::error::{EngineError, Result};
use crate::exec::ExecutionContext;
use crate::image::Image;
use crate::palette::{Palette, MAX_COLORS};

/// Palette size used when none is configured.
pub const DEFAULT_PALETTE_SIZE: usize = 16;

/// Reduction algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducerKind {
    #[default]
    MedianCut,
    #[serde(rename = "kmeans")]
    KMeans,
    Octree,
}

impl ReducerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReducerKind::MedianCut => "median_cut",
            ReducerKind::KMeans => "kmeans",
            ReducerKind::Octree => "octree",
        }
    }
}

impl fmt::Display for ReducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReducerKind {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "median_cut" => Ok(ReducerKind::MedianCut),
            "kmeans" => Ok(ReducerKind::KMeans),
            "octree" => Ok(ReducerKind::Octree),
            other => Err(EngineError::unsupported("reducer", other)),
        }
    }
}

/// Reduce `image` to at most `k` colors with the selected algorithm.
pub fn reduce(
    image: &Image,
    k: usize,
    kind: ReducerKind,
    ctx: &ExecutionContext,
) -> Result<Palette> {
    let palette = match kind {
        ReducerKind::MedianCut => median_cut(image, k)?,
        ReducerKind::KMeans => kmeans(image, k, ctx)?,
        ReducerKind::Octree => octree(image, k)?,
    };
    tracing::debug!(reducer = %kind, requested = k, produced = palette.len(), "Palette reduced");
    Ok(palette)
}

/// Reduce an image of 8-bit encoded Lab pixels. The palette is in encoded
/// Lab; pass it to [`convert_lab_palette`](crate::color::convert_lab_palette)
/// for RGB.
pub fn reduce_lab(
    image: &Image,
    k: usize,
    kind: ReducerKind,
    ctx: &ExecutionContext,
) -> Result<Palette> {
    let palette = match kind {
        ReducerKind::MedianCut => median_cut(image, k)?,
        ReducerKind::KMeans => kmeans_lab(image, k, ctx)?,
        ReducerKind::Octree => octree(image, k)?,
    };
    tracing::debug!(reducer = %kind, requested = k, produced = palette.len(), "Lab palette reduced");
    Ok(palette)
}

fn check_k(k: usize) -> Result<()> {
    if k == 0 || k > MAX_COLORS {
        return Err(EngineError::invalid(format!(
            "palette size must be between 1 and {MAX_COLORS}, got {k}"
        )));
    }
    Ok(())
}

/// A distinct color and how many pixels carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bucket {
    pub color: Pixel,
    pub count: u64,
}

/// Distinct colors of `image`, sorted by (r, g, b), with pixel counts.
pub(crate) fn histogram(image: &Image) -> Vec<Bucket> {
    let mut pixels = image.pixels().to_vec();
    pixels.sort_unstable();

    let mut buckets: Vec<Bucket> = Vec::new();
    for p in pixels {
        match buckets.last_mut() {
            Some(last) if last.color == p => last.count += 1,
            _ => buckets.push(Bucket { color: p, count: 1 }),
        }
    }
    buckets
}

/// Weighted channel mean of `buckets`, rounded to the nearest byte.
pub(crate) fn weighted_mean(buckets: &[Bucket]) -> Pixel {
    let mut sum = [0u64; 3];
    let mut total = 0u64;
    for b in buckets {
        for (c, s) in sum.iter_mut().enumerate() {
            *s += b.color.channel(c) as u64 * b.count;
        }
        total += b.count;
    }
    mean_of(sum, total)
}

pub(crate) fn mean_of(sum: [u64; 3], total: u64) -> Pixel {
    let total = total.max(1);
    let avg = |s: u64| ((s + total / 2) / total).min(255) as u8;
    Pixel::new(avg(sum[0]), avg(sum[1]), avg(sum[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn image_of(colors: &[Pixel]) -> Image {
        Image::from_pixels(colors.len(), 1, colors.to_vec()).unwrap()
    }

    #[test]
    fn test_histogram_sorted_and_counted() {
        let a = Pixel::new(9, 0, 0);
        let b = Pixel::new(1, 5, 5);
        let hist = histogram(&image_of(&[a, b, a, a]));
        assert_eq!(
            hist,
            vec![Bucket { color: b, count: 1 }, Bucket { color: a, count: 3 }]
        );
    }

    #[test]
    fn test_weighted_mean_rounds() {
        let buckets = [
            Bucket {
                color: Pixel::new(0, 0, 0),
                count: 1,
            },
            Bucket {
                color: Pixel::new(3, 255, 10),
                count: 1,
            },
        ];
        assert_eq!(weighted_mean(&buckets), Pixel::new(2, 128, 5));
    }

    #[test]
    fn test_rejects_bad_k() {
        let image = image_of(&[Pixel::BLACK]);
        let ctx = ExecutionContext::sequential();
        for kind in [ReducerKind::MedianCut, ReducerKind::KMeans, ReducerKind::Octree] {
            assert_eq!(
                reduce(&image, 0, kind, &ctx).unwrap_err().kind(),
                ErrorKind::InvalidInput
            );
            assert_eq!(
                reduce(&image, 257, kind, &ctx).unwrap_err().kind(),
                ErrorKind::InvalidInput
            );
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("kmeans".parse::<ReducerKind>().unwrap(), ReducerKind::KMeans);
        assert_eq!(
            "median_cut".parse::<ReducerKind>().unwrap(),
            ReducerKind::MedianCut
        );
        assert_eq!(
            "wu".parse::<ReducerKind>().unwrap_err().kind(),
            ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_few_colors_returned_exactly() {
        let colors = [
            Pixel::new(200, 10, 10),
            Pixel::new(10, 200, 10),
            Pixel::new(10, 10, 200),
        ];
        let image = image_of(&[colors[0], colors[1], colors[2], colors[1]]);
        let ctx = ExecutionContext::sequential();
        for kind in [ReducerKind::MedianCut, ReducerKind::KMeans, ReducerKind::Octree] {
            let palette = reduce(&image, 16, kind, &ctx).unwrap();
            let mut got = palette.colors().to_vec();
            got.sort();
            let mut want = colors.to_vec();
            want.sort();
            assert_eq!(got, want, "{kind} must return the distinct colors");
        }
    }
}
