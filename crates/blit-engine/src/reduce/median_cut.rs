//! Median-cut palette reduction.
//!
//! Works on the histogram of distinct colors, so no color is ever split
//! across two boxes and a box with one distinct color is final.

use super::{check_k, histogram, weighted_mean, Bucket};
use crate::error::Result;
use crate::image::Image;
use crate::palette::Palette;

/// Per-channel (min, max) over a box.
fn channel_ranges(entries: &[Bucket]) -> [u8; 3] {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for e in entries {
        for c in 0..3 {
            let v = e.color.channel(c);
            lo[c] = lo[c].min(v);
            hi[c] = hi[c].max(v);
        }
    }
    [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]]
}

/// Channel with the greatest range; ties go to red, then green.
fn widest_channel(ranges: [u8; 3]) -> usize {
    let mut best = 0;
    for c in 1..3 {
        if ranges[c] > ranges[best] {
            best = c;
        }
    }
    best
}

/// Split point after sorting along `channel`: the first entry at which the
/// cumulative weight reaches half the total, clamped so both halves are
/// non-empty.
fn median_split(entries: &mut [Bucket], channel: usize) -> usize {
    entries.sort_by_key(|e| (e.color.channel(channel), e.color));
    let total: u64 = entries.iter().map(|e| e.count).sum();

    let mut acc = 0u64;
    let mut split = entries.len() - 1;
    for (i, e) in entries.iter().enumerate() {
        acc += e.count;
        if acc * 2 >= total {
            split = i + 1;
            break;
        }
    }
    split.clamp(1, entries.len() - 1)
}

/// Reduce `image` to at most `k` colors by median cut.
///
/// Each round picks the box with the largest single-channel extent (ties:
/// lowest box index) and cuts it on that channel at the weighted median.
/// Stops at `k` boxes or when every box holds one distinct color. Each box
/// contributes the weighted mean of its members.
pub fn median_cut(image: &Image, k: usize) -> Result<Palette> {
    check_k(k)?;

    let mut boxes: Vec<Vec<Bucket>> = vec![histogram(image)];
    while boxes.len() < k {
        let mut pick: Option<(usize, u8)> = None;
        for (i, b) in boxes.iter().enumerate() {
            let extent = channel_ranges(b).into_iter().max().unwrap_or(0);
            if extent > 0 && pick.map_or(true, |(_, best)| extent > best) {
                pick = Some((i, extent));
            }
        }
        let Some((idx, _)) = pick else {
            break;
        };

        let channel = widest_channel(channel_ranges(&boxes[idx]));
        let split = median_split(&mut boxes[idx], channel);
        let upper = boxes[idx].split_off(split);
        boxes.push(upper);
    }

    tracing::debug!(boxes = boxes.len(), "Median cut finished");
    Ok(Palette::from_validated(
        boxes.iter().map(|b| weighted_mean(b)).collect(),
    ))
}
