//! Octree palette reduction.
//!
//! Every distinct color descends eight levels, one bit per channel per level,
//! so depth-8 nodes hold exact colors. Nodes live in an arena; their index is
//! their creation order.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::{check_k, histogram, mean_of};
use crate::color::Pixel;
use crate::error::Result;
use crate::image::Image;
use crate::palette::Palette;

const MAX_DEPTH: u8 = 8;

#[derive(Debug, Default)]
struct Node {
    sum: [u64; 3],
    count: u64,
    depth: u8,
    parent: usize,
    children: [Option<usize>; 8],
}

impl Node {
    fn is_childless(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Merge order: fewest pixels first, then deepest, then oldest.
type MergeKey = (u64, Reverse<u8>, usize);

struct Octree {
    nodes: Vec<Node>,
}

impl Octree {
    fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    fn insert(&mut self, rgb: [u8; 3], weight: u64) {
        let mut id = 0;
        for level in 0..MAX_DEPTH {
            let bit = 7 - level;
            let slot = (((rgb[0] >> bit) & 1) << 2 | ((rgb[1] >> bit) & 1) << 1 | ((rgb[2] >> bit) & 1))
                as usize;
            id = match self.nodes[id].children[slot] {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node {
                        depth: level + 1,
                        parent: id,
                        ..Node::default()
                    });
                    self.nodes[id].children[slot] = Some(child);
                    child
                }
            };
        }
        let node = &mut self.nodes[id];
        for c in 0..3 {
            node.sum[c] += rgb[c] as u64 * weight;
        }
        node.count += weight;
    }

    fn key(&self, id: usize) -> MergeKey {
        (self.nodes[id].count, Reverse(self.nodes[id].depth), id)
    }

    /// Fold `id` into its parent. Returns whether the parent already held
    /// pixels, in which case one color node disappeared.
    fn merge_into_parent(&mut self, id: usize) -> bool {
        let parent = self.nodes[id].parent;
        let (sum, count) = (self.nodes[id].sum, self.nodes[id].count);
        self.nodes[id].count = 0;
        self.nodes[id].sum = [0; 3];

        let p = &mut self.nodes[parent];
        let had_pixels = p.count > 0;
        for c in 0..3 {
            p.sum[c] += sum[c];
        }
        p.count += count;
        if let Some(slot) = p.children.iter_mut().find(|s| **s == Some(id)) {
            *slot = None;
        }
        had_pixels
    }

    /// Colors of every pixel-holding node, depth first in child order.
    fn colors(&self) -> Vec<Pixel> {
        let mut out = Vec::new();
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.count > 0 {
                out.push(mean_of(node.sum, node.count));
            }
            stack.extend(node.children.iter().rev().flatten());
        }
        out
    }
}

/// Reduce `image` to at most `k` colors with an octree.
///
/// While more than `k` nodes hold pixels, the childless non-root node with
/// the fewest pixels is folded into its parent (ties: deeper node first,
/// then earlier-created). A parent that loses its last child becomes a merge
/// candidate itself. Each surviving node contributes the mean of everything
/// it absorbed.
pub fn octree(image: &Image, k: usize) -> Result<Palette> {
    check_k(k)?;

    let mut tree = Octree::new();
    let buckets = histogram(image);
    for b in &buckets {
        tree.insert(b.color.to_array(), b.count);
    }

    let mut candidates: BTreeSet<MergeKey> = (1..tree.nodes.len())
        .filter(|&id| tree.nodes[id].count > 0)
        .map(|id| tree.key(id))
        .collect();

    let mut color_nodes = buckets.len();
    let mut merges = 0usize;
    while color_nodes > k {
        let Some((_, _, id)) = candidates.pop_first() else {
            break;
        };
        let parent = tree.nodes[id].parent;
        if tree.merge_into_parent(id) {
            color_nodes -= 1;
        }
        merges += 1;
        if parent != 0 && tree.nodes[parent].is_childless() {
            candidates.insert(tree.key(parent));
        }
    }

    tracing::debug!(k, merges, colors = color_nodes, "Octree reduced");
    Ok(Palette::from_validated(tree.colors()))
}
