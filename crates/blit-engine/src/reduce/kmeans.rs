//! k-means palette reduction in Lab space.

use super::{check_k, histogram};
use crate::color::{Lab, Pixel};
use crate::error::Result;
use crate::exec::ExecutionContext;
use crate::image::Image;
use crate::palette::Palette;

/// Iteration cap for Lloyd's algorithm.
pub const MAX_ITERATIONS: usize = 64;

fn nearest(centroids: &[Lab], color: Lab) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, &c) in centroids.iter().enumerate() {
        let d = color.distance_squared(c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Farthest-point seeding: the most frequent color first (ties: lowest in
/// (r, g, b) order), then repeatedly the color farthest from every seed.
fn seed(labs: &[Lab], counts: &[u64], k: usize) -> Vec<Lab> {
    let mut first = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[first] {
            first = i;
        }
    }

    let mut seeds = vec![labs[first]];
    let mut min_dist: Vec<f32> = labs.iter().map(|l| l.distance_squared(labs[first])).collect();
    while seeds.len() < k {
        let mut far = 0;
        for (i, &d) in min_dist.iter().enumerate() {
            if d > min_dist[far] {
                far = i;
            }
        }
        let next = labs[far];
        seeds.push(next);
        for (d, l) in min_dist.iter_mut().zip(labs) {
            *d = d.min(l.distance_squared(next));
        }
    }
    seeds
}

/// How pixel bytes map into the clustering space and back.
#[derive(Clone, Copy)]
struct Space {
    decode: fn(Pixel) -> Lab,
    encode: fn(Lab) -> Pixel,
}

const SRGB: Space = Space {
    decode: <Lab as From<Pixel>>::from,
    encode: <Pixel as From<Lab>>::from,
};

const ENCODED_LAB: Space = Space {
    decode: Lab::from_encoded,
    encode: Lab::to_encoded,
};

/// Reduce `image` to at most `k` colors by k-means clustering.
///
/// Assignment of colors to centroids runs through `ctx`; recomputing the
/// centroids waits for the whole assignment pass. Iterates until no
/// assignment changes or [`MAX_ITERATIONS`] passes. A cluster left empty is
/// reseeded with the color that lies farthest from its own centroid.
pub fn kmeans(image: &Image, k: usize, ctx: &ExecutionContext) -> Result<Palette> {
    cluster(image, k, ctx, SRGB)
}

/// k-means over an image whose pixels already hold 8-bit encoded Lab, as
/// produced by [`make_lab_image`](crate::color::make_lab_image).
///
/// Pixels are decoded straight to Lab and centroids are re-encoded, so no
/// sRGB conversion happens on either side. The palette is in encoded Lab.
pub fn kmeans_lab(image: &Image, k: usize, ctx: &ExecutionContext) -> Result<Palette> {
    cluster(image, k, ctx, ENCODED_LAB)
}

fn cluster(image: &Image, k: usize, ctx: &ExecutionContext, space: Space) -> Result<Palette> {
    check_k(k)?;

    let buckets = histogram(image);
    if buckets.len() <= k {
        return Ok(Palette::from_validated(
            buckets.iter().map(|b| b.color).collect(),
        ));
    }

    let labs: Vec<Lab> = buckets.iter().map(|b| (space.decode)(b.color)).collect();
    let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
    let mut centroids = seed(&labs, &counts, k);
    let mut assignment: Vec<usize> = Vec::new();

    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let next = ctx.map_range(labs.len(), |i| nearest(&centroids, labs[i]));
        if next == assignment {
            break;
        }
        assignment = next;

        let mut sums = vec![(0f64, 0f64, 0f64, 0u64); k];
        for ((&cluster, lab), &count) in assignment.iter().zip(&labs).zip(&counts) {
            let s = &mut sums[cluster];
            let w = count as f64;
            s.0 += lab.l as f64 * w;
            s.1 += lab.a as f64 * w;
            s.2 += lab.b as f64 * w;
            s.3 += count;
        }

        let mut taken = vec![false; labs.len()];
        for (cluster, &(l, a, b, total)) in sums.iter().enumerate() {
            if total > 0 {
                let w = total as f64;
                centroids[cluster] = Lab::new((l / w) as f32, (a / w) as f32, (b / w) as f32);
                continue;
            }
            let mut far: Option<(usize, f32)> = None;
            for (i, lab) in labs.iter().enumerate() {
                if taken[i] {
                    continue;
                }
                let d = lab.distance_squared(centroids[assignment[i]]);
                if far.map_or(true, |(_, best)| d > best) {
                    far = Some((i, d));
                }
            }
            if let Some((i, _)) = far {
                taken[i] = true;
                centroids[cluster] = labs[i];
            }
        }
    }

    tracing::debug!(k, iterations, colors = labs.len(), "k-means finished");
    Ok(Palette::from_validated(
        centroids.into_iter().map(space.encode).collect(),
    ))
}
